use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use file_counter::config::AppConfig;
use file_counter::events::{EventLog, JsonLinesObserver};
use file_counter::rename_engine::{ConfigBuilder, FileManager};
use file_counter::tui::{run_tui, App};

#[derive(Parser, Debug)]
#[command(name = "file-counter", about = "Number files in the order you choose")]
struct Cli {
    /// Files to stage on startup
    files: Vec<PathBuf>,
    /// First number to assign
    #[arg(long, default_value_t = AppConfig::DEFAULT_START_NUMBER, allow_negative_numbers = true)]
    start: i64,
    /// Copy numbered files here instead of renaming in place
    #[arg(long)]
    output: Option<PathBuf>,
    /// Append every event as a JSON line to this file
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = ConfigBuilder::new()
        .start_number(cli.start)
        .output_dir(cli.output.as_ref())
        .build()?;

    let event_log = EventLog::new(AppConfig::EVENT_LOG_CAPACITY);
    let mut manager = FileManager::new();
    manager.subscribe(Box::new(event_log.clone()));
    if let Some(path) = &cli.events {
        manager.subscribe(Box::new(JsonLinesObserver::create(path)?));
    }

    if !cli.files.is_empty() {
        let added = manager.add_files(&cli.files);
        tracing::info!(requested = cli.files.len(), added, "staged files from arguments");
    }

    let mut app = App::new(manager, event_log, config);
    run_tui(&mut app)
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let path = std::env::temp_dir().join(AppConfig::LOG_FILE_NAME);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
