//! Query guard.
//!
//! Static, pre-execution check deciding whether a submitted string may run
//! against a case database at all. A rejected query is never executed.
//!
//! Two modes exist. [`GuardMode::Keyword`] is the coarse substring filter:
//! it rejects any query mentioning a write keyword anywhere, including
//! identifiers such as `created_at` or a table called `updates`.
//! [`GuardMode::Parser`] parses the query and accepts exactly one read-only
//! `SELECT`, which removes those false positives.

mod keyword;
mod parser;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum raw (untrimmed) query length, in characters.
pub const MAX_QUERY_LENGTH: usize = 1000;

/// Substrings that reject a query in keyword mode.
pub const DISALLOWED_KEYWORDS: [&str; 10] = [
    "insert",
    "update",
    "delete",
    "drop",
    "alter",
    "create",
    "attach",
    "detach",
    "pragma",
    "transaction",
];

/// Which rule set the guard applies after the length and shape checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Keyword denylist plus the `;\s*\w` second-statement check.
    #[default]
    Keyword,
    /// Full parse, single read-only statement.
    Parser,
}

impl FromStr for GuardMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "parser" => Ok(Self::Parser),
            _ => Err(format!(
                "Invalid guard mode: {s}. Expected: keyword or parser"
            )),
        }
    }
}

impl fmt::Display for GuardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Parser => write!(f, "parser"),
        }
    }
}

/// Why the guard refused a query.
///
/// Only used for logging and diagnostics; users always see the same
/// "Invalid or unsafe SQL query" message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    /// Raw length exceeds [`MAX_QUERY_LENGTH`].
    TooLong { length: usize },
    /// Does not start with `select` after trimming.
    NotSelect,
    /// Contains a denylisted keyword somewhere in its text.
    DeniedKeyword(&'static str),
    /// A second statement follows a semicolon.
    MultipleStatements,
    /// The parser could not make sense of the text.
    Unparseable(String),
    /// Parsed, but contains something other than a plain query.
    NotReadOnly(String),
}

impl fmt::Display for GuardRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { length } => write!(
                f,
                "query is {length} characters long (limit {MAX_QUERY_LENGTH})"
            ),
            Self::NotSelect => write!(f, "query must start with SELECT"),
            Self::DeniedKeyword(keyword) => write!(f, "query contains '{keyword}'"),
            Self::MultipleStatements => write!(f, "only a single statement is allowed"),
            Self::Unparseable(msg) => write!(f, "could not parse query: {msg}"),
            Self::NotReadOnly(kind) => write!(f, "{kind} is not a read-only query"),
        }
    }
}

/// Static safety check for submitted SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryGuard {
    mode: GuardMode,
}

impl QueryGuard {
    /// Creates a guard using the given rule set.
    pub fn new(mode: GuardMode) -> Self {
        Self { mode }
    }

    /// Returns the active rule set.
    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Checks a query, returning the first rule it breaks.
    pub fn check(&self, sql: &str) -> std::result::Result<(), GuardRejection> {
        let length = sql.chars().count();
        if length > MAX_QUERY_LENGTH {
            return Err(GuardRejection::TooLong { length });
        }

        let normalized = sql.trim().to_lowercase();
        if !normalized.starts_with("select") {
            return Err(GuardRejection::NotSelect);
        }

        match self.mode {
            GuardMode::Keyword => keyword::check(&normalized),
            GuardMode::Parser => parser::check(sql),
        }
    }

    /// Returns true if the query may be executed.
    pub fn is_safe(&self, sql: &str) -> bool {
        self.check(sql).is_ok()
    }
}

/// Convenience function to run the default (keyword) guard.
pub fn guard_query(sql: &str) -> bool {
    QueryGuard::default().is_safe(sql)
}
