//! Clue validation.
//!
//! Judges whether a query answers a clue. The validator is stateless: it
//! never reads or writes progress, so the same query gets the same verdict
//! every time. Advancing a cursor is the caller's job (see
//! [`crate::progress::Progress::advance`]).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{AnswerSpec, CaseCatalog, Clue};
use crate::db::{QueryResult, StatementExecutor};
use crate::error::{DetectiveError, Result};
use crate::guard::QueryGuard;

/// Outcome of judging a query that ran successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The query answers the clue.
    Accepted,
    /// The rows differ from the expected result.
    IncorrectResult,
    /// The text differs from the expected query.
    IncorrectQuery,
    /// The clue has no answer specification to judge against.
    NoCriteria,
}

impl Verdict {
    /// Returns true if the clue is solved.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// User-facing message for the verdict.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Accepted => "Correct! Clue unlocked.",
            Self::IncorrectResult => "Incorrect result. Try again.",
            Self::IncorrectQuery => "Incorrect query. Try again.",
            Self::NoCriteria => "No validation criteria set for this clue.",
        }
    }
}

/// Text form used for expected-query comparison.
fn normalize_query(sql: &str) -> String {
    sql.trim().to_lowercase()
}

/// Compares a query and its result against a clue's answer specification.
pub fn judge(clue: &Clue, query: &str, result: &QueryResult) -> Verdict {
    match clue.answer_spec() {
        AnswerSpec::ExpectedResult(expected) => {
            if result.same_rows(&expected) {
                Verdict::Accepted
            } else {
                Verdict::IncorrectResult
            }
        }
        AnswerSpec::ExpectedQuery(expected) => {
            if normalize_query(query) == normalize_query(&expected) {
                Verdict::Accepted
            } else {
                Verdict::IncorrectQuery
            }
        }
        AnswerSpec::Unset => Verdict::NoCriteria,
    }
}

/// Resolves clues, guards and runs queries, then judges them.
#[derive(Clone)]
pub struct ClueValidator {
    catalog: Arc<dyn CaseCatalog>,
    executor: Arc<dyn StatementExecutor>,
    guard: QueryGuard,
}

impl ClueValidator {
    /// Creates a validator over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CaseCatalog>,
        executor: Arc<dyn StatementExecutor>,
        guard: QueryGuard,
    ) -> Self {
        Self {
            catalog,
            executor,
            guard,
        }
    }

    /// Returns the guard applied before execution.
    pub fn guard(&self) -> &QueryGuard {
        &self.guard
    }

    /// Validates `query` as the answer to clue `clue_index` of `case_id`.
    ///
    /// Errors, in the order they are checked: the case or clue does not
    /// exist, the guard rejects the query, or the engine cannot run it.
    /// A query that runs always yields a [`Verdict`].
    pub async fn validate(&self, case_id: &str, clue_index: usize, query: &str) -> Result<Verdict> {
        let clue = self.catalog.get_clue(case_id, clue_index).await?;

        if let Err(rejection) = self.guard.check(query) {
            warn!("Rejected query for {case_id} clue {clue_index}: {rejection}");
            return Err(DetectiveError::UnsafeQuery(rejection));
        }

        let result = self.executor.execute(case_id, query).await?;
        let verdict = judge(&clue, query, &result);

        debug!(case_id, clue_index, ?verdict, "Judged clue");
        Ok(verdict)
    }
}
