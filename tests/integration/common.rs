//! Shared fixtures: a small case database written to a temp directory.

use sql_detective::config::Config;
use sql_detective::Detective;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tempfile::TempDir;

pub const CASE_ID: &str = "ledger";

const LEDGER_SQL: &str = r#"
CREATE TABLE case_metadata (
    title TEXT,
    description TEXT,
    starting_clue TEXT,
    difficulty TEXT,
    required_concept TEXT
);
INSERT INTO case_metadata VALUES (
    'The Vanishing Ledger',
    'The town ledger disappeared from the council office overnight.',
    'Start with the residents of Elm Street.',
    'easy',
    'WHERE'
);

CREATE TABLE clues (
    clue_index INTEGER PRIMARY KEY,
    text TEXT NOT NULL,
    hint TEXT,
    expected_query TEXT,
    expected_result TEXT
);
INSERT INTO clues VALUES
    (0, 'Who lives on Elm Street?', 'Filter suspects by street.', NULL, '[["Alice"], ["Carol"]]'),
    (1, 'How many crimes were reported?', NULL, 'SELECT COUNT(*) FROM crimes', NULL),
    (2, 'How tall is Bob?', 'Heights are in metres.', NULL, '[[1.8]]'),
    (3, 'Who was seen at the office?', NULL, NULL, '{"answer": "Bob"}'),
    (4, 'Who took the ledger?', NULL, '', '');

CREATE TABLE suspects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    street TEXT,
    height REAL
);
INSERT INTO suspects VALUES
    (1, 'Alice', 'Elm', 1.65),
    (2, 'Bob', 'Oak', 1.8),
    (3, 'Carol', 'Elm', NULL);

CREATE TABLE crimes (
    id INTEGER PRIMARY KEY,
    kind TEXT,
    created_at TEXT
);
INSERT INTO crimes VALUES (1, 'theft', '2024-01-15');
"#;

/// Writes `<dir>/<case_id>.db` from a SQL script.
pub async fn write_case(dir: &Path, case_id: &str, script: &str) {
    let mut conn: SqliteConnection = SqliteConnectOptions::new()
        .filename(dir.join(format!("{case_id}.db")))
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    sqlx::raw_sql(script).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
}

/// Creates a cases directory holding the ledger case.
pub async fn cases_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), CASE_ID, LEDGER_SQL).await;
    dir
}

/// Builds a detective over the given cases directory with default settings.
pub fn detective(dir: &Path) -> Detective {
    let config = Config {
        cases_dir: Some(dir.to_path_buf()),
        ..Default::default()
    };
    Detective::from_config(&config)
}
