//! Serializable outcomes returned across the core boundary.
//!
//! Every failure becomes a value here; callers never need to inspect
//! [`DetectiveError`] to render a response.

use serde::{Deserialize, Serialize};

use crate::db::{QueryResult, Row};
use crate::error::{DetectiveError, Result};
use crate::validator::Verdict;

/// Message shown when a query could not be run at all.
const UNRUNNABLE_MESSAGE: &str = "Query could not be run.";

/// Machine-readable kind of a validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Accepted,
    Incorrect,
    NotConfigured,
    Unsafe,
    NotFound,
    ExecutionError,
    AlreadySolved,
}

/// Result of validating a query against a clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: OutcomeStatus,
}

impl ValidationOutcome {
    fn rejected(status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
            error: None,
            status,
        }
    }

    /// Outcome for submitting against a case that is already solved.
    pub fn already_solved() -> Self {
        Self::rejected(OutcomeStatus::AlreadySolved, "Case already solved.")
    }
}

impl From<Verdict> for ValidationOutcome {
    fn from(verdict: Verdict) -> Self {
        let status = match verdict {
            Verdict::Accepted => OutcomeStatus::Accepted,
            Verdict::IncorrectResult | Verdict::IncorrectQuery => OutcomeStatus::Incorrect,
            Verdict::NoCriteria => OutcomeStatus::NotConfigured,
        };
        Self {
            accepted: verdict.is_accepted(),
            message: verdict.message().to_string(),
            error: None,
            status,
        }
    }
}

impl From<DetectiveError> for ValidationOutcome {
    fn from(error: DetectiveError) -> Self {
        match error {
            DetectiveError::UnsafeQuery(_) => {
                Self::rejected(OutcomeStatus::Unsafe, error.to_string())
            }
            DetectiveError::CaseNotFound(_) | DetectiveError::ClueNotFound { .. } => {
                Self::rejected(OutcomeStatus::NotFound, error.to_string())
            }
            other => Self {
                error: Some(other.to_string()),
                ..Self::rejected(OutcomeStatus::ExecutionError, UNRUNNABLE_MESSAGE)
            },
        }
    }
}

impl From<Result<Verdict>> for ValidationOutcome {
    fn from(result: Result<Verdict>) -> Self {
        match result {
            Ok(verdict) => verdict.into(),
            Err(error) => error.into(),
        }
    }
}

/// Result of running a query without judging it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl From<Result<QueryResult>> for ExecutionOutcome {
    fn from(result: Result<QueryResult>) -> Self {
        match result {
            Ok(result) => Self {
                success: true,
                execution_time_ms: Some(result.execution_time.as_millis() as u64),
                columns: Some(result.columns),
                rows: Some(result.rows),
                error: None,
            },
            Err(error) => Self {
                success: false,
                rows: None,
                columns: None,
                error: Some(error.to_string()),
                execution_time_ms: None,
            },
        }
    }
}
