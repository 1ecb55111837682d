//! Error types for SQL Detective.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

use crate::guard::GuardRejection;

/// Main error type for SQL Detective operations.
#[derive(Error, Debug)]
pub enum DetectiveError {
    /// The query failed the static safety rules and was never executed.
    #[error("Invalid or unsafe SQL query")]
    UnsafeQuery(GuardRejection),

    /// The case identifier does not resolve to a case database.
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    /// The clue index does not exist for the case.
    #[error("Clue {clue_index} not found in case {case_id}")]
    ClueNotFound { case_id: String, clue_index: usize },

    /// Query execution errors, carrying the engine's own message.
    #[error("{0}")]
    Query(String),

    /// A case database is unreadable or missing its metadata.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store errors (state database unavailable, migration failed, etc.)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectiveError {
    /// Creates a query execution error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a catalog error with the given message.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates a clue-not-found error.
    pub fn clue_not_found(case_id: impl Into<String>, clue_index: usize) -> Self {
        Self::ClueNotFound {
            case_id: case_id.into(),
            clue_index,
        }
    }

    /// Returns true if the error means a case or clue did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CaseNotFound(_) | Self::ClueNotFound { .. })
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsafeQuery(_) => "Unsafe Query",
            Self::CaseNotFound(_) | Self::ClueNotFound { .. } => "Not Found",
            Self::Query(_) => "Query Error",
            Self::Catalog(_) => "Catalog Error",
            Self::Config(_) => "Configuration Error",
            Self::Persistence(_) => "Persistence Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using DetectiveError.
pub type Result<T> = std::result::Result<T, DetectiveError>;
