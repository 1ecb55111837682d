//! SQLite execution adapter.
//!
//! Every call opens its own read-only connection to the case file and
//! closes it before returning, on success and on error alike.

use crate::db::{QueryResult, Row, StatementExecutor, Value};
use crate::error::{DetectiveError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection, Row as SqlxRow, TypeInfo, ValueRef};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 2;

/// VM instructions between deadline checks.
const PROGRESS_HANDLER_OPS: i32 = 1000;

const TIMEOUT_MESSAGE: &str = "Query took too long to execute";
const MULTIPLE_STATEMENTS_MESSAGE: &str = "You can only execute one statement at a time.";

/// Returns true if `case_id` is safe to turn into a file name.
pub fn is_valid_case_id(case_id: &str) -> bool {
    !case_id.is_empty()
        && case_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Resolves the database file backing a case.
///
/// Ids that are not plain names, and ids without a file, are not found.
pub fn case_db_path(cases_dir: &Path, case_id: &str) -> Result<PathBuf> {
    if !is_valid_case_id(case_id) {
        return Err(DetectiveError::CaseNotFound(case_id.to_string()));
    }

    let path = cases_dir.join(format!("{case_id}.db"));
    if !path.is_file() {
        return Err(DetectiveError::CaseNotFound(case_id.to_string()));
    }

    Ok(path)
}

/// Opens a read-only connection to an existing database file.
pub async fn open_read_only(path: &Path) -> Result<SqliteConnection> {
    SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .disable_statement_logging()
        .connect()
        .await
        .map_err(|e| {
            DetectiveError::catalog(format!("Failed to open {}: {e}", path.display()))
        })
}

/// Executes queries against the case databases in a directory.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    cases_dir: PathBuf,
    timeout: Duration,
}

impl SqliteExecutor {
    /// Creates an executor for the case files under `cases_dir`.
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
            timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    /// Sets the per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the directory case files are resolved against.
    pub fn cases_dir(&self) -> &Path {
        &self.cases_dir
    }
}

#[async_trait]
impl StatementExecutor for SqliteExecutor {
    async fn execute(&self, case_id: &str, sql: &str) -> Result<QueryResult> {
        let path = case_db_path(&self.cases_dir, case_id)?;
        ensure_single_statement(sql)?;
        let mut conn = open_read_only(&path).await?;

        let start = Instant::now();
        let fetched = fetch_with_deadline(&mut conn, sql, self.timeout).await;
        let execution_time = start.elapsed();

        if let Err(e) = conn.close().await {
            warn!("Failed to close connection to case {case_id}: {e}");
        }

        let result = fetched?;

        let columns: Vec<String> = result
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        debug!(
            case_id,
            rows = rows.len(),
            elapsed_ms = execution_time.as_millis() as u64,
            "Executed query"
        );

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }
}

/// Rejects text holding more than one statement.
///
/// The SQLite driver would otherwise run every statement and concatenate
/// their rows. Stray semicolons and trailing comments are not statements.
fn ensure_single_statement(sql: &str) -> Result<()> {
    let tokens = Tokenizer::new(&SQLiteDialect {}, sql)
        .tokenize()
        .map_err(|e| DetectiveError::query(e.to_string()))?;

    let mut statements = 0;
    let mut in_statement = false;
    for token in &tokens {
        match token {
            Token::Whitespace(_) => {}
            Token::SemiColon => in_statement = false,
            _ if !in_statement => {
                statements += 1;
                in_statement = true;
            }
            _ => {}
        }
    }

    if statements > 1 {
        return Err(DetectiveError::query(MULTIPLE_STATEMENTS_MESSAGE));
    }
    Ok(())
}

/// Runs `sql` and interrupts the engine once `timeout` has elapsed.
///
/// The progress handler runs on the thread stepping the statement, so the
/// deadline holds even though the driver works off the async runtime.
async fn fetch_with_deadline(
    conn: &mut SqliteConnection,
    sql: &str,
    timeout: Duration,
) -> Result<Vec<SqliteRow>> {
    let timed_out = Arc::new(AtomicBool::new(false));
    {
        let deadline = Instant::now() + timeout;
        let flag = timed_out.clone();
        let mut handle = conn.lock_handle().await.map_err(format_query_error)?;
        handle.set_progress_handler(PROGRESS_HANDLER_OPS, move || {
            if Instant::now() < deadline {
                return true;
            }
            flag.store(true, Ordering::Relaxed);
            false
        });
    }

    sqlx::query(sql).fetch_all(&mut *conn).await.map_err(|e| {
        if timed_out.load(Ordering::Relaxed) {
            DetectiveError::query(TIMEOUT_MESSAGE)
        } else {
            format_query_error(e)
        }
    })
}

/// Surfaces the engine's own message for database errors.
fn format_query_error(error: sqlx::Error) -> DetectiveError {
    match error {
        sqlx::Error::Database(db_err) => DetectiveError::query(db_err.message()),
        other => DetectiveError::query(other.to_string()),
    }
}

/// Converts a SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single column value using its runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
