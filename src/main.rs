//! curlbox - import curl commands and API collections into one request model
//!
//! Requests are printed as JSON; `--save` and `--history` put them into the
//! saved-requests store or the history kept in the data directory.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curlbox::config::Config;
use curlbox::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use curlbox::storage::{FileBlobStore, HistoryStore, SavedStore};
use curlbox::{fingerprint, import, parse_curl, to_curl, IngestError, RequestRecord};

#[derive(Debug, Parser)]
#[command(name = APP_NAME)]
#[command(bin_name = APP_NAME)]
#[command(version = APP_VERSION, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.curlbox/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmds: CliCommands,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    /// Parse a curl command (`-` reads it from stdin)
    Curl {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
        /// Store the request in the saved requests
        #[arg(long)]
        save: bool,
        /// Record the request in history
        #[arg(long)]
        history: bool,
    },
    /// Import a Postman collection, Insomnia export or exported requests
    Import {
        file: PathBuf,
        #[arg(long)]
        save: bool,
    },
    /// Print the fingerprint of a curl command
    Fingerprint {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Inspect or clear the request history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Manage saved requests
    Saved {
        #[command(subcommand)]
        action: Option<SavedAction>,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    List,
    Clear,
}

#[derive(Debug, Subcommand)]
enum SavedAction {
    List,
    /// Print a saved request as a curl command
    Curl { id: String },
    Delete { id: String },
    Clear,
    /// Print every saved request as JSON
    Export,
}

fn main() {
    let cli = Cli::parse();

    #[allow(clippy::exit)]
    if let Err(err) = run(cli) {
        match err.downcast_ref::<IngestError>() {
            Some(ingest) => eprintln!("{}: {}", APP_NAME, ingest.user_message()),
            None => eprintln!("{}: {:#}", APP_NAME, err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let _guard = init_logging(&config)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "Loaded config");

    let backend = FileBlobStore::new(&config.data_dir);

    match cli.cmds {
        CliCommands::Curl {
            command,
            save,
            history,
        } => {
            let record = parse_curl(&read_command(&command)?)?;
            if let Some(path) = &record.body_file {
                eprintln!("note: the body refers to the file `{}`; attach it manually", path);
            }
            let record = if history {
                HistoryStore::open(backend.clone(), config.history_limit)?.add(record)?
            } else {
                record
            };
            let record = if save {
                SavedStore::open(backend, config.saved_limit)?.save(record)?
            } else {
                record
            };
            print_json(&record)?;
        }
        CliCommands::Import { file, save } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let document: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("`{}` is not valid JSON", file.display()))?;
            let (format, records) = import::import_document(&document)?;
            eprintln!("Imported {} request(s) from {} document", records.len(), format.as_str());
            if save {
                SavedStore::open(backend, config.saved_limit)?.import(records.clone())?;
            }
            print_json(&records)?;
        }
        CliCommands::Fingerprint { command } => {
            let record = parse_curl(&read_command(&command)?)?;
            println!("{}", fingerprint(&record));
        }
        CliCommands::History { action } => {
            let mut store = HistoryStore::open(backend, config.history_limit)?;
            match action.unwrap_or(HistoryAction::List) {
                HistoryAction::List => print_summary(store.get_all()),
                HistoryAction::Clear => store.clear()?,
            }
        }
        CliCommands::Saved { action } => {
            let mut store = SavedStore::open(backend, config.saved_limit)?;
            match action.unwrap_or(SavedAction::List) {
                SavedAction::List => print_summary(store.get_all()),
                SavedAction::Curl { id } => match store.get(&id) {
                    Some(record) => println!("{}", to_curl(record)),
                    None => bail!("no saved request with id `{}`", id),
                },
                SavedAction::Delete { id } => {
                    if !store.delete(&id)? {
                        bail!("no saved request with id `{}`", id);
                    }
                }
                SavedAction::Clear => store.clear()?,
                SavedAction::Export => println!("{}", store.export_json()?),
            }
        }
    }

    Ok(())
}

/// Initialize logging to file
fn init_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create `{}`", config.data_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&config.data_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
    Ok(guard)
}

/// The command words joined back together, or stdin for `-`
fn read_command(words: &[String]) -> Result<String> {
    if let [only] = words {
        if only == "-" {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read curl command from stdin")?;
            return Ok(input);
        }
    }
    Ok(words.join(" "))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(records: &[RequestRecord]) {
    for record in records {
        let when = record
            .created_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "{}  {}  {:<7} {}  {}",
            record.id,
            when,
            record.method.as_str(),
            record.full_url(),
            record.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_version(), Some(APP_VERSION));
    }

    #[test]
    fn save_flag_before_command_words() {
        let cli = Cli::try_parse_from(["curlbox", "curl", "--save", "curl", "-X", "PUT", "https://x"]).unwrap();
        match cli.cmds {
            CliCommands::Curl { command, save, history } => {
                assert!(save);
                assert!(!history);
                assert_eq!(command.join(" "), "curl -X PUT https://x");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
