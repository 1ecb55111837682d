//! Integration tests for judging answers against real case files.

use super::common::{self, CASE_ID};
use pretty_assertions::assert_eq;
use sql_detective::outcome::{OutcomeStatus, ValidationOutcome};

const ELM_QUERY: &str = "SELECT name FROM suspects WHERE street = 'Elm' ORDER BY id";

async fn validate(clue_index: usize, query: &str) -> ValidationOutcome {
    let dir = common::cases_dir().await;
    common::detective(dir.path())
        .validate_clue(CASE_ID, clue_index, query)
        .await
}

#[tokio::test]
async fn test_expected_result_accepted() {
    let outcome = validate(0, ELM_QUERY).await;
    assert_eq!(
        outcome,
        ValidationOutcome {
            accepted: true,
            message: "Correct! Clue unlocked.".to_string(),
            error: None,
            status: OutcomeStatus::Accepted,
        }
    );
}

#[tokio::test]
async fn test_expected_result_is_order_sensitive() {
    let outcome = validate(
        0,
        "SELECT name FROM suspects WHERE street = 'Elm' ORDER BY id DESC",
    )
    .await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, OutcomeStatus::Incorrect);
    assert_eq!(outcome.message, "Incorrect result. Try again.");
}

#[tokio::test]
async fn test_extra_columns_are_incorrect() {
    let outcome = validate(
        0,
        "SELECT name, street FROM suspects WHERE street = 'Elm' ORDER BY id",
    )
    .await;
    assert_eq!(outcome.status, OutcomeStatus::Incorrect);
}

#[tokio::test]
async fn test_expected_query_ignores_case_and_outer_whitespace() {
    let outcome = validate(1, "  select count(*) from crimes\n").await;
    assert!(outcome.accepted);
}

#[tokio::test]
async fn test_expected_query_is_literal() {
    // Same answer, different text.
    let outcome = validate(1, "SELECT COUNT(id) FROM crimes").await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.message, "Incorrect query. Try again.");
}

#[tokio::test]
async fn test_float_result() {
    let outcome = validate(2, "SELECT height FROM suspects WHERE name = 'Bob'").await;
    assert!(outcome.accepted, "{outcome:?}");
}

#[tokio::test]
async fn test_non_tabular_expected_result_means_empty_table() {
    let outcome = validate(3, "SELECT name FROM suspects WHERE id > 100").await;
    assert!(outcome.accepted);

    let outcome = validate(3, "SELECT name FROM suspects WHERE id = 2").await;
    assert_eq!(outcome.status, OutcomeStatus::Incorrect);
}

#[tokio::test]
async fn test_clue_without_criteria() {
    let outcome = validate(4, "SELECT name FROM suspects").await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, OutcomeStatus::NotConfigured);
    assert_eq!(outcome.message, "No validation criteria set for this clue.");
}

#[tokio::test]
async fn test_missing_clue() {
    let outcome = validate(9, ELM_QUERY).await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound);
    assert_eq!(outcome.message, "Clue 9 not found in case ledger");
}

#[tokio::test]
async fn test_missing_case_wins_over_unsafe_query() {
    let dir = common::cases_dir().await;
    let outcome = common::detective(dir.path())
        .validate_clue("missing", 0, "DROP TABLE suspects")
        .await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound);
    assert_eq!(outcome.message, "Case not found: missing");
}

#[tokio::test]
async fn test_unsafe_query() {
    let outcome = validate(0, "SELECT name FROM suspects; DELETE FROM suspects").await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, OutcomeStatus::Unsafe);
    assert_eq!(outcome.message, "Invalid or unsafe SQL query");
}

#[tokio::test]
async fn test_execution_error() {
    let outcome = validate(0, "SELECT nme FROM suspects").await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, OutcomeStatus::ExecutionError);
    assert_eq!(outcome.error.as_deref(), Some("no such column: nme"));
}

#[tokio::test]
async fn test_clues_can_be_validated_out_of_order() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let later = detective
        .validate_clue(CASE_ID, 2, "SELECT height FROM suspects WHERE name = 'Bob'")
        .await;
    let again = detective
        .validate_clue(CASE_ID, 2, "SELECT height FROM suspects WHERE name = 'Bob'")
        .await;
    assert!(later.accepted);
    assert_eq!(later, again);
}
