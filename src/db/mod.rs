//! Case database access for SQL Detective.
//!
//! Provides the execution seam the validator runs queries through, so a
//! real SQLite executor and test doubles can be used interchangeably.

mod mock;
mod sqlite;
mod types;

pub use mock::{FailingExecutor, MockExecutor};
pub use sqlite::{
    case_db_path, is_valid_case_id, open_read_only, SqliteExecutor, DEFAULT_QUERY_TIMEOUT_SECS,
};
pub use types::{QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining how already-guarded queries reach a case database.
///
/// Implementations are a pass-through to the storage engine, not an extra
/// trust boundary: callers guard queries before handing them over.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Executes a SQL query against the named case and returns the results.
    async fn execute(&self, case_id: &str, sql: &str) -> Result<QueryResult>;
}
