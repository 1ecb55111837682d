//! Case and clue catalog.
//!
//! Cases are provisioned out-of-band as one SQLite file each; the catalog
//! only ever reads them. Clue answers never leave the catalog through
//! serialization: `expected_query` and `expected_result` are skipped.

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::db::QueryResult;
use crate::error::{DetectiveError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One puzzle scenario backed by one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub title: String,
    pub description: String,
    pub starting_clue: String,
    pub difficulty: String,
    pub required_concept: String,
    /// Tables the player can query.
    #[serde(default)]
    pub schema_info: Vec<TableSchema>,
}

/// A table in a case database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

/// A column and its declared type (may be empty in SQLite).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// One stage of a case's puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// 0-based position; clues are solved in index order.
    pub clue_index: usize,
    pub text: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(skip_serializing, default)]
    pub expected_query: Option<String>,
    /// Serialized JSON array of row arrays.
    #[serde(skip_serializing, default)]
    pub expected_result: Option<String>,
}

/// The criterion a clue is judged by.
#[derive(Debug, Clone)]
pub enum AnswerSpec {
    /// The query's rows must equal these, in order.
    ExpectedResult(QueryResult),
    /// The query text must equal this, ignoring case and surrounding whitespace.
    ExpectedQuery(String),
    /// Neither criterion is set.
    Unset,
}

impl Clue {
    /// Creates a clue with no hint and no answer.
    pub fn new(clue_index: usize, text: impl Into<String>) -> Self {
        Self {
            clue_index,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_expected_query(mut self, sql: impl Into<String>) -> Self {
        self.expected_query = Some(sql.into());
        self
    }

    pub fn with_expected_result(mut self, json: impl Into<String>) -> Self {
        self.expected_result = Some(json.into());
        self
    }

    /// Resolves the authoritative criterion.
    ///
    /// A non-empty expected result wins over an expected query.
    pub fn answer_spec(&self) -> AnswerSpec {
        if let Some(json) = self.expected_result.as_deref().filter(|s| !s.is_empty()) {
            return AnswerSpec::ExpectedResult(QueryResult::from_expected_json(json));
        }
        if let Some(sql) = self.expected_query.as_deref().filter(|s| !s.is_empty()) {
            return AnswerSpec::ExpectedQuery(sql.to_string());
        }
        AnswerSpec::Unset
    }
}

/// Read access to cases and their clues.
#[async_trait]
pub trait CaseCatalog: Send + Sync {
    /// Lists every available case, ordered by id.
    async fn list_cases(&self) -> Result<Vec<Case>>;

    /// Loads one case's metadata and schema.
    async fn get_case(&self, case_id: &str) -> Result<Case>;

    /// Loads a case's clues ordered by index.
    async fn get_clues(&self, case_id: &str) -> Result<Vec<Clue>>;

    /// Loads one clue.
    async fn get_clue(&self, case_id: &str, clue_index: usize) -> Result<Clue> {
        self.get_clues(case_id)
            .await?
            .into_iter()
            .find(|clue| clue.clue_index == clue_index)
            .ok_or_else(|| DetectiveError::clue_not_found(case_id, clue_index))
    }

    /// Loads the hint for one clue, if it has one.
    async fn get_hint(&self, case_id: &str, clue_index: usize) -> Result<Option<String>> {
        Ok(self.get_clue(case_id, clue_index).await?.hint)
    }
}
