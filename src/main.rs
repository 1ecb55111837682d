//! sql-detective - play SQL murder mysteries from the command line.

mod cli;
mod logging;

use cli::{Cli, Command};
use serde::Serialize;
use sql_detective::catalog::{Case, Clue};
use sql_detective::config::Config;
use sql_detective::outcome::{ExecutionOutcome, ValidationOutcome};
use sql_detective::progress::Progress;
use sql_detective::session::SessionStore;
use sql_detective::{Detective, DetectiveError, Result};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    let cli = Cli::parse_args();
    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let detective = Detective::from_config(&config);
    let json = cli.json;

    match cli.command {
        Command::Cases => {
            let cases = detective.list_cases().await?;
            if json {
                return print_json(&cases);
            }
            if cases.is_empty() {
                println!("No cases found in {}", config.cases_dir().display());
            }
            for case in &cases {
                println!("{}\t{}\t{}", case.case_id, case.difficulty, case.title);
            }
        }
        Command::Case { case_id } => {
            let case = detective.get_case(&case_id).await?;
            if json {
                return print_json(&case);
            }
            print_case(&case);
        }
        Command::Clues { case_id } => {
            let clues = detective.get_clues(&case_id).await?;
            if json {
                return print_json(&clues);
            }
            for clue in &clues {
                print_clue(clue);
            }
        }
        Command::Hint {
            case_id,
            clue_index,
        } => {
            let hint = detective.get_hint(&case_id, clue_index).await?;
            if json {
                return print_json(&serde_json::json!({ "hint": hint }));
            }
            println!("{}", hint.as_deref().unwrap_or("No hint for this clue."));
        }
        Command::Check { query } => {
            let rejection = detective.guard().check(&query).err();
            if json {
                return print_json(&serde_json::json!({
                    "safe": rejection.is_none(),
                    "reason": rejection.as_ref().map(ToString::to_string),
                }));
            }
            match rejection {
                None => println!("Query is allowed."),
                Some(reason) => println!("Query rejected: {reason}"),
            }
        }
        Command::Run { case_id, query } => {
            let outcome = detective.execute_query(&case_id, &query).await;
            if json {
                return print_json(&outcome);
            }
            print_execution(&outcome);
        }
        Command::Validate {
            case_id,
            clue_index,
            query,
        } => {
            let outcome = detective.validate_clue(&case_id, clue_index, &query).await;
            if json {
                return print_json(&outcome);
            }
            print_validation(&outcome);
        }
        Command::Submit { case_id, query } => {
            let store = open_session(&config).await?;
            let clue_count = detective.get_clues(&case_id).await?.len();
            let progress = store.load(&case_id, clue_count).await?;

            let (next, outcome) = detective.submit(progress.clone(), &query).await;
            if next != progress {
                store.save(&next).await?;
            }
            store.close().await;

            if json {
                return print_json(&serde_json::json!({
                    "outcome": outcome,
                    "progress": next,
                }));
            }
            print_validation(&outcome);
            print_progress(&next);
        }
        Command::Progress { case_id } => {
            let store = open_session(&config).await?;
            let clue_count = detective.get_clues(&case_id).await?.len();
            let progress = store.load(&case_id, clue_count).await?;
            store.close().await;

            if json {
                return print_json(&progress);
            }
            print_progress(&progress);
        }
        Command::Reset { case_id } => {
            let store = open_session(&config).await?;
            let existed = store.reset(&case_id).await?;
            store.close().await;

            if json {
                return print_json(&serde_json::json!({ "reset": existed }));
            }
            if existed {
                println!("Progress for {case_id} cleared.");
            } else {
                println!("No saved progress for {case_id}.");
            }
        }
    }

    Ok(())
}

/// Builds the effective configuration.
///
/// Precedence: command line, then config file, then environment.
fn load_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config);
    config.apply_env_defaults();
    Ok(config)
}

async fn open_session(config: &Config) -> Result<SessionStore> {
    match &config.state_db {
        Some(path) => SessionStore::open(path).await,
        None => SessionStore::open_default().await,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DetectiveError::internal(format!("Failed to encode output: {e}")))?;
    println!("{text}");
    Ok(())
}

fn print_case(case: &Case) {
    println!("{} ({})", case.title, case.difficulty);
    println!();
    println!("{}", case.description);
    println!();
    println!("Starting clue: {}", case.starting_clue);
    if !case.required_concept.is_empty() {
        println!("Concept: {}", case.required_concept);
    }
    println!();
    for table in &case.schema_info {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                if c.data_type.is_empty() {
                    c.name.clone()
                } else {
                    format!("{} {}", c.name, c.data_type)
                }
            })
            .collect();
        println!("  {}({})", table.table_name, columns.join(", "));
    }
}

fn print_clue(clue: &Clue) {
    println!("[{}] {}", clue.clue_index, clue.text);
}

fn print_execution(outcome: &ExecutionOutcome) {
    if let Some(error) = &outcome.error {
        println!("Error: {error}");
        return;
    }

    let columns = outcome.columns.as_deref().unwrap_or_default();
    let rows = outcome.rows.as_deref().unwrap_or_default();
    if !columns.is_empty() {
        println!("{}", columns.join("\t"));
    }
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_display_string()).collect();
        println!("{}", cells.join("\t"));
    }
    match outcome.execution_time_ms {
        Some(ms) => println!("({} rows, {ms} ms)", rows.len()),
        None => println!("({} rows)", rows.len()),
    }
}

fn print_validation(outcome: &ValidationOutcome) {
    println!("{}", outcome.message);
    if let Some(error) = &outcome.error {
        println!("Error: {error}");
    }
}

fn print_progress(progress: &Progress) {
    if progress.is_solved() {
        println!("Case {} solved!", progress.case_id);
    } else {
        println!(
            "Case {}: clue {} of {}",
            progress.case_id,
            progress.current_clue_index + 1,
            progress.clue_count
        );
    }
}
