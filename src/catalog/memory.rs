//! In-memory catalog for tests and embedding.

use super::{Case, CaseCatalog, Clue};
use crate::error::{DetectiveError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A catalog holding cases in memory, keyed by case id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    cases: BTreeMap<String, (Case, Vec<Clue>)>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a case; clues are stored sorted by index.
    pub fn with_case(mut self, case: Case, mut clues: Vec<Clue>) -> Self {
        clues.sort_by_key(|clue| clue.clue_index);
        self.cases.insert(case.case_id.clone(), (case, clues));
        self
    }

    fn entry(&self, case_id: &str) -> Result<&(Case, Vec<Clue>)> {
        self.cases
            .get(case_id)
            .ok_or_else(|| DetectiveError::CaseNotFound(case_id.to_string()))
    }
}

#[async_trait]
impl CaseCatalog for MemoryCatalog {
    async fn list_cases(&self) -> Result<Vec<Case>> {
        Ok(self.cases.values().map(|(case, _)| case.clone()).collect())
    }

    async fn get_case(&self, case_id: &str) -> Result<Case> {
        Ok(self.entry(case_id)?.0.clone())
    }

    async fn get_clues(&self, case_id: &str) -> Result<Vec<Clue>> {
        Ok(self.entry(case_id)?.1.clone())
    }
}
