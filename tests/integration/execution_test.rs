//! Integration tests for running queries against case databases.

use super::common::{self, CASE_ID};
use pretty_assertions::assert_eq;
use sql_detective::config::{Config, ExecutionConfig, GuardConfig};
use sql_detective::db::{SqliteExecutor, StatementExecutor, Value};
use sql_detective::guard::GuardMode;
use sql_detective::outcome::OutcomeStatus;
use sql_detective::{Detective, DetectiveError};
use std::time::{Duration, Instant};

const ENDLESS_QUERY: &str =
    "SELECT count(*) FROM (WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n) SELECT x FROM n)";

#[tokio::test]
async fn test_run_select() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let outcome = detective
        .execute_query(CASE_ID, "SELECT id, name, height FROM suspects ORDER BY id")
        .await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(
        outcome.columns,
        Some(vec!["id".to_string(), "name".to_string(), "height".to_string()])
    );
    assert_eq!(
        outcome.rows,
        Some(vec![
            vec![Value::Int(1), Value::from("Alice"), Value::Float(1.65)],
            vec![Value::Int(2), Value::from("Bob"), Value::Float(1.8)],
            vec![Value::Int(3), Value::from("Carol"), Value::Null],
        ])
    );
    assert!(outcome.execution_time_ms.is_some());
}

#[tokio::test]
async fn test_empty_result_has_no_columns() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let outcome = detective
        .execute_query(CASE_ID, "SELECT name FROM suspects WHERE street = 'Pine'")
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.columns, Some(vec![]));
    assert_eq!(outcome.rows, Some(vec![]));
}

#[tokio::test]
async fn test_engine_error_is_surfaced() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let outcome = detective.execute_query(CASE_ID, "SELECT * FROM alibis").await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("no such table: alibis"));
    assert_eq!(outcome.rows, None);
}

#[tokio::test]
async fn test_unsafe_query_is_rejected() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    for query in [
        "DELETE FROM suspects",
        "SELECT * FROM suspects; DROP TABLE suspects",
        "select * from updates",
    ] {
        let outcome = detective.execute_query(CASE_ID, query).await;
        assert!(!outcome.success, "{query}");
        assert_eq!(outcome.error.as_deref(), Some("Invalid or unsafe SQL query"));
    }

    let outcome = detective
        .execute_query(CASE_ID, "SELECT COUNT(*) FROM suspects")
        .await;
    assert_eq!(outcome.rows, Some(vec![vec![Value::Int(3)]]));
}

#[tokio::test]
async fn test_parser_guard_allows_keyword_false_positives() {
    let dir = common::cases_dir().await;
    let keyword = common::detective(dir.path());
    assert!(!keyword.guard_query("SELECT created_at FROM crimes"));

    let config = Config {
        cases_dir: Some(dir.path().to_path_buf()),
        guard: GuardConfig {
            mode: GuardMode::Parser,
        },
        ..Default::default()
    };
    let detective = Detective::from_config(&config);

    let outcome = detective
        .execute_query(CASE_ID, "SELECT created_at FROM crimes")
        .await;
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.rows, Some(vec![vec![Value::from("2024-01-15")]]));

    let outcome = detective
        .execute_query(CASE_ID, "SELECT 1; SELECT 2")
        .await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn test_unknown_case() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    for case_id in ["missing", "../ledger", ""] {
        let outcome = detective.execute_query(case_id, "SELECT 1").await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.error,
            Some(format!("Case not found: {case_id}")),
            "{case_id:?}"
        );
    }
}

#[tokio::test]
async fn test_connection_is_read_only() {
    let dir = common::cases_dir().await;
    let executor = SqliteExecutor::new(dir.path());

    // Straight to the adapter, skipping the guard.
    let err = executor
        .execute(CASE_ID, "DELETE FROM suspects")
        .await
        .unwrap_err();
    assert!(matches!(err, DetectiveError::Query(_)));
    assert!(err.to_string().contains("readonly"), "{err}");

    let result = executor
        .execute(CASE_ID, "SELECT COUNT(*) FROM suspects")
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());
    let query = "SELECT name FROM suspects WHERE street = 'Elm'";

    let first = detective.execute_query(CASE_ID, query).await;
    let second = detective.execute_query(CASE_ID, query).await;
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.columns, second.columns);
}

#[tokio::test]
async fn test_only_one_statement_runs() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());
    // A comment after the semicolon gets past the keyword guard's text check.
    let query = "SELECT name FROM suspects WHERE id = 1;/**/SELECT name FROM suspects WHERE id = 3";
    assert!(detective.guard_query(query));

    let outcome = detective.execute_query(CASE_ID, query).await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("You can only execute one statement at a time.")
    );

    // Together the two statements would produce clue 0's expected rows.
    let outcome = detective.validate_clue(CASE_ID, 0, query).await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.status, OutcomeStatus::ExecutionError);

    let outcome = detective
        .execute_query(CASE_ID, "SELECT name FROM suspects WHERE id = 1; -- first only")
        .await;
    assert_eq!(outcome.rows, Some(vec![vec![Value::from("Alice")]]));
}

#[tokio::test]
async fn test_slow_query_is_interrupted() {
    let dir = common::cases_dir().await;
    let executor = SqliteExecutor::new(dir.path()).with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(20),
        executor.execute(CASE_ID, ENDLESS_QUERY),
    )
    .await
    .expect("executor did not enforce its timeout");

    let err = result.unwrap_err();
    assert!(
        matches!(err, DetectiveError::Query(ref message) if message == "Query took too long to execute"),
        "{err}"
    );
    assert!(started.elapsed() < Duration::from_secs(10));

    // The next call gets a fresh connection and a fresh deadline.
    let result = executor
        .execute(CASE_ID, "SELECT COUNT(*) FROM suspects")
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
}

#[tokio::test]
async fn test_configured_timeout_applies_to_guarded_queries() {
    let dir = common::cases_dir().await;
    let config = Config {
        cases_dir: Some(dir.path().to_path_buf()),
        execution: ExecutionConfig { timeout_secs: 1 },
        ..Default::default()
    };
    let detective = Detective::from_config(&config);
    assert!(detective.guard_query(ENDLESS_QUERY));

    let outcome = tokio::time::timeout(
        Duration::from_secs(20),
        detective.execute_query(CASE_ID, ENDLESS_QUERY),
    )
    .await
    .expect("configured timeout did not fire");
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Query took too long to execute"));
}
