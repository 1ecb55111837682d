//! Catalog backed by the case database files themselves.
//!
//! Each case file carries a one-row `case_metadata` table and a `clues`
//! table. Every lookup opens its own read-only connection and closes it
//! before returning.

use super::{Case, CaseCatalog, Clue, ColumnSchema, TableSchema};
use crate::db::{case_db_path, is_valid_case_id, open_read_only};
use crate::error::{DetectiveError, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

type MetadataRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

type ClueRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Reads cases from `<cases_dir>/<case_id>.db` files.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    cases_dir: PathBuf,
}

impl SqliteCatalog {
    /// Creates a catalog over the given directory.
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
        }
    }

    /// Returns the directory cases are read from.
    pub fn cases_dir(&self) -> &Path {
        &self.cases_dir
    }

    /// Ids of every `*.db` file in the cases directory, sorted.
    fn case_ids(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.cases_dir).map_err(|e| {
            DetectiveError::catalog(format!(
                "Failed to read cases directory {}: {e}",
                self.cases_dir.display()
            ))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == "db"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(String::from)
            })
            .filter(|id| is_valid_case_id(id))
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn connect(&self, case_id: &str) -> Result<SqliteConnection> {
        let path = case_db_path(&self.cases_dir, case_id)?;
        open_read_only(&path).await
    }
}

async fn release(conn: SqliteConnection, case_id: &str) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection to case {case_id}: {e}");
    }
}

async fn read_case(conn: &mut SqliteConnection, case_id: &str) -> Result<Case> {
    let metadata: Option<MetadataRow> = sqlx::query_as(
        "SELECT title, description, starting_clue, difficulty, required_concept FROM case_metadata",
    )
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| DetectiveError::catalog(format!("Failed to read metadata for {case_id}: {e}")))?;

    let (title, description, starting_clue, difficulty, required_concept) = metadata
        .ok_or_else(|| DetectiveError::catalog(format!("Case metadata not found for {case_id}")))?;

    let schema_info = read_schema(conn, case_id).await?;

    Ok(Case {
        case_id: case_id.to_string(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        starting_clue: starting_clue.unwrap_or_default(),
        difficulty: difficulty.unwrap_or_default(),
        required_concept: required_concept.unwrap_or_default(),
        schema_info,
    })
}

async fn read_schema(conn: &mut SqliteConnection, case_id: &str) -> Result<Vec<TableSchema>> {
    let table_names: Vec<String> = sqlx::query_scalar(
        r"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\' ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| DetectiveError::catalog(format!("Failed to list tables for {case_id}: {e}")))?;

    let mut tables = Vec::with_capacity(table_names.len());
    for table_name in table_names {
        let columns: Vec<(String, String)> =
            sqlx::query_as("SELECT name, type FROM pragma_table_info(?) ORDER BY cid")
                .bind(&table_name)
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| {
                    DetectiveError::catalog(format!(
                        "Failed to read columns of {table_name} in {case_id}: {e}"
                    ))
                })?;

        tables.push(TableSchema {
            table_name,
            columns: columns
                .into_iter()
                .map(|(name, data_type)| ColumnSchema { name, data_type })
                .collect(),
        });
    }

    Ok(tables)
}

async fn read_clues(conn: &mut SqliteConnection, case_id: &str) -> Result<Vec<Clue>> {
    let rows: Vec<ClueRow> = sqlx::query_as(
        "SELECT clue_index, text, hint, expected_query, expected_result FROM clues ORDER BY clue_index ASC",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| DetectiveError::catalog(format!("Failed to read clues for {case_id}: {e}")))?;

    rows.into_iter()
        .map(|(index, text, hint, expected_query, expected_result)| {
            let clue_index = usize::try_from(index).map_err(|_| {
                DetectiveError::catalog(format!("Negative clue index {index} in {case_id}"))
            })?;
            Ok(Clue {
                clue_index,
                text: text.unwrap_or_default(),
                hint,
                expected_query,
                expected_result,
            })
        })
        .collect()
}

#[async_trait]
impl CaseCatalog for SqliteCatalog {
    async fn list_cases(&self) -> Result<Vec<Case>> {
        let mut cases = Vec::new();
        for case_id in self.case_ids()? {
            match self.get_case(&case_id).await {
                Ok(case) => cases.push(case),
                Err(e) => warn!("Skipping case {case_id}: {e}"),
            }
        }
        debug!("Found {} cases in {}", cases.len(), self.cases_dir.display());
        Ok(cases)
    }

    async fn get_case(&self, case_id: &str) -> Result<Case> {
        let mut conn = self.connect(case_id).await?;
        let result = read_case(&mut conn, case_id).await;
        release(conn, case_id).await;
        result
    }

    async fn get_clues(&self, case_id: &str) -> Result<Vec<Clue>> {
        let mut conn = self.connect(case_id).await?;
        let result = read_clues(&mut conn, case_id).await;
        release(conn, case_id).await;
        result
    }
}
