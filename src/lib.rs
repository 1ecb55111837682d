//! SQL Detective - the game core behind a SQL murder mystery.
//!
//! Players answer clues by writing SELECT queries against a per-case SQLite
//! database. This library guards those queries, runs them read-only and
//! judges them against each clue's expected answer.

pub mod catalog;
pub mod config;
pub mod db;
pub mod detective;
pub mod error;
pub mod guard;
pub mod outcome;
pub mod progress;
pub mod session;
pub mod validator;

pub use detective::Detective;
pub use error::{DetectiveError, Result};
