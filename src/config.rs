//! Configuration management for SQL Detective.
//!
//! Handles loading configuration from TOML files and environment variables:
//! where case databases live, how queries are guarded and how long they may
//! run.

use crate::db::DEFAULT_QUERY_TIMEOUT_SECS;
use crate::error::{DetectiveError, Result};
use crate::guard::GuardMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the cases directory.
pub const CASES_DIR_ENV: &str = "SQL_DETECTIVE_CASES_DIR";

/// Cases directory used when nothing else sets one.
const DEFAULT_CASES_DIR: &str = "cases";

/// Main configuration structure for SQL Detective.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding one `<case_id>.db` file per case.
    pub cases_dir: Option<PathBuf>,

    /// Session state database path.
    pub state_db: Option<PathBuf>,

    /// Query execution settings.
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Query guard settings.
    #[serde(default)]
    pub guard: GuardConfig,
}

/// Query execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Per-query timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExecutionConfig {
    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Query guard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// `keyword` (default) or `parser`.
    #[serde(default)]
    pub mode: GuardMode,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-detective")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DetectiveError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            DetectiveError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.execution.timeout_secs == 0 {
            return Err(DetectiveError::config(
                "execution.timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Applies the cases directory from the environment if the file set none.
    pub fn apply_env_defaults(&mut self) {
        if self.cases_dir.is_none() {
            self.cases_dir = std::env::var_os(CASES_DIR_ENV).map(PathBuf::from);
        }
    }

    /// Returns the configured cases directory, or `cases` when unset.
    pub fn cases_dir(&self) -> PathBuf {
        self.cases_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CASES_DIR))
    }
}
