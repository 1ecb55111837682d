//! Per-case progress cursor.
//!
//! Owned by the caller's session, passed into the core and handed back
//! advanced. The core never persists it.

use serde::{Deserialize, Serialize};

/// Index of the next unsolved clue for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub case_id: String,
    /// In `0..=clue_count`; equal to `clue_count` once solved.
    pub current_clue_index: usize,
    pub clue_count: usize,
}

impl Progress {
    /// Starts a case at its first clue.
    pub fn new(case_id: impl Into<String>, clue_count: usize) -> Self {
        Self {
            case_id: case_id.into(),
            current_clue_index: 0,
            clue_count,
        }
    }

    /// Restores a saved cursor, clamped to the case's clue count.
    pub fn resume(case_id: impl Into<String>, cursor: usize, clue_count: usize) -> Self {
        Self {
            case_id: case_id.into(),
            current_clue_index: cursor.min(clue_count),
            clue_count,
        }
    }

    /// Returns true once every clue is solved.
    pub fn is_solved(&self) -> bool {
        self.current_clue_index >= self.clue_count
    }

    /// Returns the next cursor after judging clue `clue_index`.
    ///
    /// Moves forward by exactly one, and only for an accepted answer to
    /// the current clue of an unsolved case.
    pub fn advance(&self, clue_index: usize, accepted: bool) -> Self {
        let mut next = self.clone();
        if accepted && !self.is_solved() && clue_index == self.current_clue_index {
            next.current_clue_index += 1;
        }
        next
    }
}
