//! The core boundary.
//!
//! `Detective` wires a catalog, an executor and a guard together and turns
//! every result into a serializable outcome. HTTP handlers, the CLI or any
//! other front end call into the game through here.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{Case, CaseCatalog, Clue, SqliteCatalog};
use crate::config::Config;
use crate::db::{QueryResult, SqliteExecutor, StatementExecutor};
use crate::error::{DetectiveError, Result};
use crate::guard::QueryGuard;
use crate::outcome::{ExecutionOutcome, ValidationOutcome};
use crate::progress::Progress;
use crate::validator::ClueValidator;

/// Entry point for guarding, running and judging queries.
#[derive(Clone)]
pub struct Detective {
    catalog: Arc<dyn CaseCatalog>,
    executor: Arc<dyn StatementExecutor>,
    validator: ClueValidator,
}

impl Detective {
    /// Creates a detective over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CaseCatalog>,
        executor: Arc<dyn StatementExecutor>,
        guard: QueryGuard,
    ) -> Self {
        let validator = ClueValidator::new(catalog.clone(), executor.clone(), guard);
        Self {
            catalog,
            executor,
            validator,
        }
    }

    /// Creates a detective reading case files from the configured directory.
    pub fn from_config(config: &Config) -> Self {
        let cases_dir = config.cases_dir();
        debug!(
            "Using cases from {} with {} guard",
            cases_dir.display(),
            config.guard.mode
        );
        let catalog = Arc::new(SqliteCatalog::new(cases_dir.clone()));
        let executor =
            Arc::new(SqliteExecutor::new(cases_dir).with_timeout(config.execution.timeout()));
        Self::new(catalog, executor, QueryGuard::new(config.guard.mode))
    }

    /// Returns the active guard.
    pub fn guard(&self) -> &QueryGuard {
        self.validator.guard()
    }

    /// Returns true if the query may be executed.
    pub fn guard_query(&self, query: &str) -> bool {
        self.guard().is_safe(query)
    }

    /// Runs a query against a case without judging it.
    ///
    /// The guard runs first; a rejected query is never sent to the engine.
    pub async fn execute_query(&self, case_id: &str, query: &str) -> ExecutionOutcome {
        self.try_execute(case_id, query).await.into()
    }

    async fn try_execute(&self, case_id: &str, query: &str) -> Result<QueryResult> {
        if let Err(rejection) = self.guard().check(query) {
            warn!("Rejected query for {case_id}: {rejection}");
            return Err(DetectiveError::UnsafeQuery(rejection));
        }
        self.executor.execute(case_id, query).await
    }

    /// Judges `query` as the answer to one clue. Stateless.
    pub async fn validate_clue(
        &self,
        case_id: &str,
        clue_index: usize,
        query: &str,
    ) -> ValidationOutcome {
        self.validator.validate(case_id, clue_index, query).await.into()
    }

    /// Starts a case at its first clue.
    pub async fn start(&self, case_id: &str) -> Result<Progress> {
        let clues = self.catalog.get_clues(case_id).await?;
        Ok(Progress::new(case_id, clues.len()))
    }

    /// Judges `query` against the clue under the cursor and returns the
    /// cursor to keep, advanced by one on a correct answer.
    pub async fn submit(&self, progress: Progress, query: &str) -> (Progress, ValidationOutcome) {
        if progress.is_solved() {
            return (progress, ValidationOutcome::already_solved());
        }

        let clue_index = progress.current_clue_index;
        let outcome = self
            .validate_clue(&progress.case_id, clue_index, query)
            .await;
        let next = progress.advance(clue_index, outcome.accepted);
        (next, outcome)
    }

    /// Lists every available case.
    pub async fn list_cases(&self) -> Result<Vec<Case>> {
        self.catalog.list_cases().await
    }

    /// Loads one case.
    pub async fn get_case(&self, case_id: &str) -> Result<Case> {
        self.catalog.get_case(case_id).await
    }

    /// Loads a case's clues in solve order.
    pub async fn get_clues(&self, case_id: &str) -> Result<Vec<Clue>> {
        self.catalog.get_clues(case_id).await
    }

    /// Loads the hint for one clue.
    pub async fn get_hint(&self, case_id: &str, clue_index: usize) -> Result<Option<String>> {
        self.catalog.get_hint(case_id, clue_index).await
    }
}
