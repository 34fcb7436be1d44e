use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use pawmatch_core::storage::KeyValueStore;
use pawmatch_infrastructure::{ConfigService, PawPaths, TomlKeyValueStore};
use pawmatch_interaction::FetchApiClient;

mod app;
mod command;
mod helper;

use app::{Flow, ShellApp};
use command::Command;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "pawmatch")]
#[command(about = "PawMatch - find an adoptable dog from the terminal", long_about = None)]
struct Cli {
    /// Catalog service root URL (overrides config and PAWMATCH_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding config.toml and state.toml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Persisted state file (overrides config and PAWMATCH_STATE_FILE)
    #[arg(long)]
    state_file: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pawmatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // ===== Configuration =====
    let paths = match cli.config_dir {
        Some(dir) => PawPaths::with_root(dir),
        None => PawPaths::from_platform().context("Failed to resolve config directory")?,
    };
    let config_service = ConfigService::new(paths);
    let mut config = config_service.load()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(state_file) = cli.state_file {
        config.state_file = Some(state_file);
    }
    let state_file = config_service.state_file(&config);
    tracing::debug!(
        "[Shell] base_url={} state_file={}",
        config.base_url,
        state_file.display()
    );

    // ===== Backend Initialization =====
    let api = Arc::new(FetchApiClient::from_config(&config)?);
    let store: Arc<dyn KeyValueStore> = Arc::new(TomlKeyValueStore::open(state_file));
    let mut app = ShellApp::new(api, store, &config);

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== PawMatch ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, or 'quit' to exit.".bright_black());
    app.start().await;
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline("paw> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match Command::parse(trimmed) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{}", usage.yellow());
                        continue;
                    }
                };

                if app.execute(command).await == Flow::Exit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    app.shutdown();
    Ok(())
}
