//! Command-line argument parsing for sql-detective.

use clap::{Parser, Subcommand};
use sql_detective::config::Config;
use sql_detective::guard::GuardMode;
use std::path::PathBuf;

/// Solve SQL murder mysteries from the terminal.
#[derive(Parser, Debug)]
#[command(name = "sql-detective")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding one <case_id>.db file per case
    #[arg(long, value_name = "PATH", global = true)]
    pub cases_dir: Option<PathBuf>,

    /// Session state database path
    #[arg(long, value_name = "PATH", global = true)]
    pub state_db: Option<PathBuf>,

    /// Query guard to apply (keyword or parser)
    #[arg(long, value_name = "MODE", global = true)]
    pub guard: Option<GuardMode>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List available cases
    Cases,

    /// Show a case briefing and its tables
    Case { case_id: String },

    /// List the clues of a case
    Clues { case_id: String },

    /// Show the hint for a clue
    Hint { case_id: String, clue_index: usize },

    /// Check whether a query would be allowed to run
    Check { query: String },

    /// Run a query against a case database
    Run { case_id: String, query: String },

    /// Judge a query as the answer to a specific clue
    Validate {
        case_id: String,
        clue_index: usize,
        query: String,
    },

    /// Answer the current clue and move on if correct
    Submit { case_id: String, query: String },

    /// Show saved progress for a case
    Progress { case_id: String },

    /// Forget saved progress for a case
    Reset { case_id: String },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.cases_dir {
            config.cases_dir = Some(dir.clone());
        }
        if let Some(path) = &self.state_db {
            config.state_db = Some(path.clone());
        }
        if let Some(mode) = self.guard {
            config.guard.mode = mode;
        }
    }
}
