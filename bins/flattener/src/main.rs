// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::print_stdout, clippy::print_stderr)]
//! flattener: flatten nested JSON arrays and browse stored results.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use flat_app_core::config::{ConfigError, ConfigService};
use flat_app_core::prefs::{FlattenerPrefs, StoreKind, PREFS_KEY};
use flat_config_fs::FsConfigStore;
use flat_graph::{rebuild_record, FlatRecord};
use flat_service::{ApiError, FlatGateway};
use flat_store::{FlatRepository, FsStore, MemoryStore};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flatten nested JSON arrays and keep a history of results")]
struct Cli {
    /// Record store backend (overrides the saved preference)
    #[arg(long, value_enum, global = true)]
    store: Option<StoreArg>,
    /// Directory for the fs store (overrides the saved preference)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Maximum number of records listed
    #[arg(long, global = true)]
    limit: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Flatten a JSON array read from FILE (or stdin) and store the result
    Flatten {
        /// Input document; `-` or absent reads stdin
        file: Option<PathBuf>,
        /// Print the result without storing it
        #[arg(long)]
        no_store: bool,
    },
    /// List stored results, newest first
    List,
    /// Rebuild a stored record document into its nested and flat forms
    Rebuild {
        /// Record document as written by the fs store
        file: PathBuf,
    },
    /// Print the effective preferences
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StoreArg {
    Memory,
    Fs,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Memory => Self::Memory,
            StoreArg::Fs => Self::Fs,
        }
    }
}

impl Cli {
    /// Command-line flags win over saved preferences.
    fn apply(&self, mut prefs: FlattenerPrefs) -> FlattenerPrefs {
        if let Some(store) = self.store {
            prefs.store = store.into();
        }
        if let Some(dir) = &self.data_dir {
            prefs.data_dir = Some(dir.clone());
        }
        if let Some(limit) = self.limit {
            prefs.page_limit = limit;
        }
        prefs
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (prefs, config_err) = load_prefs();
    let prefs = cli.apply(prefs);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&prefs.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    if let Some(err) = config_err {
        warn!(error = %err, "preferences unavailable; using defaults");
    }
    debug!(?prefs, "effective preferences");

    run(cli.command, &prefs)
}

// Best-effort: a missing or unwritable config dir never blocks a run.
fn load_prefs() -> (FlattenerPrefs, Option<ConfigError>) {
    let store = match FsConfigStore::new() {
        Ok(store) => store,
        Err(err) => return (FlattenerPrefs::default(), Some(err)),
    };
    match ConfigService::new(store).load_or_init::<FlattenerPrefs>(PREFS_KEY) {
        Ok((prefs, save_err)) => (prefs, save_err),
        Err(err) => (FlattenerPrefs::default(), Some(err)),
    }
}

fn run(command: Command, prefs: &FlattenerPrefs) -> Result<ExitCode> {
    match command {
        Command::Flatten { file, no_store } => {
            let body = read_input(file.as_deref())?;
            let reply = if no_store {
                FlatGateway::new(MemoryStore::new()).flat_response_bytes(&body)
            } else {
                FlatGateway::new(open_store(prefs)?).flat_response_bytes(&body)
            };
            respond(reply)
        }
        Command::List => respond(FlatGateway::new(open_store(prefs)?).get_flats()),
        Command::Rebuild { file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let record: FlatRecord = serde_json::from_slice(&bytes)
                .with_context(|| format!("{} is not a flat record", file.display()))?;
            let entry = rebuild_record(&record)
                .with_context(|| format!("failed to rebuild {}", file.display()))?;
            print_json(&entry)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            print_json(prefs)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_store(prefs: &FlattenerPrefs) -> Result<Box<dyn FlatRepository>> {
    let store: Box<dyn FlatRepository> = match prefs.store {
        StoreKind::Memory => Box::new(MemoryStore::with_limit(prefs.page_limit)),
        StoreKind::Fs => {
            let store = match &prefs.data_dir {
                Some(dir) => FsStore::open(dir),
                None => FsStore::new(),
            }
            .context("failed to open flat store")?;
            Box::new(store.with_limit(prefs.page_limit))
        }
    };
    Ok(store)
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn respond<T: Serialize>(reply: Result<T, ApiError>) -> Result<ExitCode> {
    match reply {
        Ok(body) => {
            print_json(&body)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if let Some(cause) = err.cause() {
                debug!(%cause, "request failed");
            }
            print_json(&err)?;
            Ok(if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_prefs() {
        let cli = Cli::try_parse_from([
            "flattener",
            "list",
            "--store",
            "memory",
            "--limit",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::List);
        let prefs = cli.apply(FlattenerPrefs::default());
        assert_eq!(prefs.store, StoreKind::Memory);
        assert_eq!(prefs.page_limit, 7);
        assert_eq!(prefs.data_dir, None);
        assert_eq!(prefs.log_filter, "info");
    }

    #[test]
    fn absent_flags_keep_prefs() {
        let cli = Cli::try_parse_from(["flattener", "flatten", "-", "--no-store"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Flatten {
                file: Some(PathBuf::from("-")),
                no_store: true,
            }
        );
        let saved = FlattenerPrefs {
            page_limit: 3,
            data_dir: Some(PathBuf::from("/var/lib/flats")),
            ..FlattenerPrefs::default()
        };
        assert_eq!(cli.apply(saved.clone()), saved);
    }

    #[test]
    fn rebuild_requires_a_file() {
        assert!(Cli::try_parse_from(["flattener", "rebuild"]).is_err());
        assert!(Cli::try_parse_from(["flattener", "list", "--store", "s3"]).is_err());
    }

    #[test]
    fn memory_store_honours_page_limit() {
        let prefs = FlattenerPrefs {
            store: StoreKind::Memory,
            page_limit: 1,
            ..FlattenerPrefs::default()
        };
        let mut gw = FlatGateway::new(open_store(&prefs).unwrap());
        gw.flat_response_bytes(b"[1]").unwrap();
        gw.flat_response_bytes(b"[2]").unwrap();
        assert_eq!(gw.get_flats().unwrap().len(), 1);
    }
}
