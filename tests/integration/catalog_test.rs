//! Integration tests for reading cases from database files.

use super::common::{self, CASE_ID};
use pretty_assertions::assert_eq;
use sql_detective::catalog::{CaseCatalog, ColumnSchema, SqliteCatalog};
use sql_detective::DetectiveError;

#[tokio::test]
async fn test_get_case() {
    let dir = common::cases_dir().await;
    let catalog = SqliteCatalog::new(dir.path());

    let case = catalog.get_case(CASE_ID).await.unwrap();
    assert_eq!(case.case_id, CASE_ID);
    assert_eq!(case.title, "The Vanishing Ledger");
    assert_eq!(case.difficulty, "easy");
    assert_eq!(case.required_concept, "WHERE");

    let tables: Vec<&str> = case
        .schema_info
        .iter()
        .map(|t| t.table_name.as_str())
        .collect();
    assert_eq!(tables, vec!["case_metadata", "clues", "crimes", "suspects"]);

    let suspects = &case.schema_info[3];
    assert_eq!(
        suspects.columns,
        vec![
            ColumnSchema {
                name: "id".to_string(),
                data_type: "INTEGER".to_string(),
            },
            ColumnSchema {
                name: "name".to_string(),
                data_type: "TEXT".to_string(),
            },
            ColumnSchema {
                name: "street".to_string(),
                data_type: "TEXT".to_string(),
            },
            ColumnSchema {
                name: "height".to_string(),
                data_type: "REAL".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_get_clues_in_order_without_answers() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let clues = detective.get_clues(CASE_ID).await.unwrap();
    let indexes: Vec<usize> = clues.iter().map(|c| c.clue_index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    assert_eq!(clues[0].text, "Who lives on Elm Street?");

    let json = serde_json::to_value(&clues).unwrap();
    for clue in json.as_array().unwrap() {
        assert!(clue.get("expected_query").is_none());
        assert!(clue.get("expected_result").is_none());
    }
}

#[tokio::test]
async fn test_get_hint() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    assert_eq!(
        detective.get_hint(CASE_ID, 0).await.unwrap().as_deref(),
        Some("Filter suspects by street.")
    );
    assert_eq!(detective.get_hint(CASE_ID, 1).await.unwrap(), None);

    let err = detective.get_hint(CASE_ID, 7).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_case() {
    let dir = common::cases_dir().await;
    let catalog = SqliteCatalog::new(dir.path());

    let err = catalog.get_case("missing").await.unwrap_err();
    assert!(matches!(err, DetectiveError::CaseNotFound(ref id) if id == "missing"));
    assert!(catalog.get_clues("../missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_cases_skips_broken_files() {
    let dir = common::cases_dir().await;
    common::write_case(
        dir.path(),
        "archive",
        "CREATE TABLE case_metadata (title TEXT, description TEXT, starting_clue TEXT, \
         difficulty TEXT, required_concept TEXT);
         INSERT INTO case_metadata VALUES ('The Archive', 'Dusty.', 'Look up.', 'hard', 'JOIN');
         CREATE TABLE clues (clue_index INTEGER, text TEXT, hint TEXT, \
         expected_query TEXT, expected_result TEXT);",
    )
    .await;
    // No metadata table.
    common::write_case(dir.path(), "draft", "CREATE TABLE notes (body TEXT);").await;
    std::fs::write(dir.path().join("README.txt"), "not a case").unwrap();

    let detective = common::detective(dir.path());
    let cases = detective.list_cases().await.unwrap();
    let ids: Vec<&str> = cases.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["archive", CASE_ID]);
}

#[tokio::test]
async fn test_missing_cases_dir() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = SqliteCatalog::new(dir.path().join("nowhere"));

    let err = catalog.list_cases().await.unwrap_err();
    assert_eq!(err.category(), "Catalog Error");
}

#[tokio::test]
async fn test_start_counts_clues() {
    let dir = common::cases_dir().await;
    let detective = common::detective(dir.path());

    let progress = detective.start(CASE_ID).await.unwrap();
    assert_eq!(progress.current_clue_index, 0);
    assert_eq!(progress.clue_count, 5);
}

const LOOSE_CASE_SQL: &str = r#"
CREATE TABLE case_metadata (title TEXT, description TEXT, starting_clue TEXT,
    difficulty TEXT, required_concept TEXT);
INSERT INTO case_metadata VALUES ('Loose Ends', NULL, NULL, 'medium', NULL);
CREATE TABLE clues (clue_index INTEGER, text TEXT, hint TEXT,
    expected_query TEXT, expected_result TEXT);
INSERT INTO clues VALUES
    (0, NULL, NULL, NULL, '[["Quinn"]]'),
    (1, 'Name the witness', NULL, NULL, '[["Quinn"]]');
CREATE TABLE sqlitex (name TEXT);
INSERT INTO sqlitex VALUES ('Quinn');
"#;

#[tokio::test]
async fn test_tables_named_like_sqlite_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    common::write_case(dir.path(), "loose", LOOSE_CASE_SQL).await;

    let case = SqliteCatalog::new(dir.path()).get_case("loose").await.unwrap();
    let tables: Vec<&str> = case
        .schema_info
        .iter()
        .map(|t| t.table_name.as_str())
        .collect();
    assert_eq!(tables, vec!["case_metadata", "clues", "sqlitex"]);
}

#[tokio::test]
async fn test_clue_without_text_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    common::write_case(dir.path(), "loose", LOOSE_CASE_SQL).await;
    let detective = common::detective(dir.path());

    let clues = detective.get_clues("loose").await.unwrap();
    assert_eq!(clues[0].text, "");
    assert_eq!(clues[1].text, "Name the witness");

    let outcome = detective
        .validate_clue("loose", 0, "SELECT name FROM sqlitex")
        .await;
    assert!(outcome.accepted, "{outcome:?}");
}
