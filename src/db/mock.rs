//! Test doubles for the execution seam.
//!
//! Provides in-memory executors for unit tests and embedding.

use super::{QueryResult, StatementExecutor};
use crate::error::{DetectiveError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An executor that returns predefined results keyed by query text.
///
/// Unknown queries produce an empty result set. Keys are matched after
/// trimming surrounding whitespace.
#[derive(Debug, Default)]
pub struct MockExecutor {
    results: HashMap<String, QueryResult>,
    executions: AtomicUsize,
}

impl MockExecutor {
    /// Creates a mock executor with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the result returned for `sql`.
    pub fn with_result(mut self, sql: &str, result: QueryResult) -> Self {
        self.results.insert(sql.trim().to_string(), result);
        self
    }

    /// Number of queries that reached this executor.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatementExecutor for MockExecutor {
    async fn execute(&self, _case_id: &str, sql: &str) -> Result<QueryResult> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.get(sql.trim()).cloned().unwrap_or_default())
    }
}

/// An executor whose every query fails with the given engine message.
#[derive(Debug, Clone)]
pub struct FailingExecutor {
    message: String,
}

impl FailingExecutor {
    /// Creates an executor failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StatementExecutor for FailingExecutor {
    async fn execute(&self, _case_id: &str, _sql: &str) -> Result<QueryResult> {
        Err(DetectiveError::query(self.message.clone()))
    }
}
