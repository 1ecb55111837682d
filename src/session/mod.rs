//! Caller-side session store.
//!
//! Keeps one progress cursor per case in a local SQLite state database so
//! the CLI can resume a case between runs. This is the session layer that
//! owns [`Progress`]; case databases are never written.

mod migrations;

use crate::error::{DetectiveError, Result};
use crate::progress::Progress;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Persistent progress cursors.
pub struct SessionStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SessionStore {
    /// Opens or creates the state database at the default platform path.
    ///
    /// - Linux: `~/.local/state/sql-detective/state.db`
    /// - elsewhere: the platform config directory
    pub async fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open(&path).await
    }

    /// Opens or creates the state database at the specified path.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::ensure_parent_dirs(path)?;

        let pool = Self::connect(path).await?;
        migrations::run_migrations(&pool).await?;
        debug!("State database opened at {}", path.display());

        Ok(Self {
            pool,
            db_path: path.to_path_buf(),
        })
    }

    /// Returns the default state database path for the current platform.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::state_dir()
            .or_else(dirs::config_dir)
            .ok_or_else(|| DetectiveError::persistence("Could not determine state directory"))?;
        Ok(base.join("sql-detective").join("state.db"))
    }

    /// Creates a connection pool to the SQLite database.
    async fn connect(path: &Path) -> Result<SqlitePool> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| DetectiveError::persistence(format!("Invalid database path: {e}")))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                DetectiveError::persistence(format!("Failed to connect to state database: {e}"))
            })
    }

    /// Ensures parent directories exist for the database path.
    fn ensure_parent_dirs(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DetectiveError::persistence(format!(
                    "Failed to create state directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }

    /// Loads the saved progress for a case, starting fresh if none exists.
    pub async fn load(&self, case_id: &str, clue_count: usize) -> Result<Progress> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT current_clue_index FROM progress WHERE case_id = ?")
                .bind(case_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DetectiveError::persistence(format!("Failed to load progress: {e}")))?;

        let cursor = row
            .map(|(cursor,)| usize::try_from(cursor).unwrap_or(0))
            .unwrap_or(0);
        Ok(Progress::resume(case_id, cursor, clue_count))
    }

    /// Saves a cursor, replacing any earlier one for the case.
    pub async fn save(&self, progress: &Progress) -> Result<()> {
        let cursor = i64::try_from(progress.current_clue_index)
            .map_err(|_| DetectiveError::internal("Progress cursor out of range"))?;

        sqlx::query(
            r#"
            INSERT INTO progress (case_id, current_clue_index, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(case_id) DO UPDATE SET
                current_clue_index = excluded.current_clue_index,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&progress.case_id)
        .bind(cursor)
        .execute(&self.pool)
        .await
        .map_err(|e| DetectiveError::persistence(format!("Failed to save progress: {e}")))?;

        debug!(
            "Saved progress for {}: {}/{}",
            progress.case_id, progress.current_clue_index, progress.clue_count
        );
        Ok(())
    }

    /// Forgets the cursor for a case. Returns true if one existed.
    pub async fn reset(&self, case_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM progress WHERE case_id = ?")
            .bind(case_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DetectiveError::persistence(format!("Failed to reset progress: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns the path to the state database.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
