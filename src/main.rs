// ABOUTME: Main entry point for the simple-tracker CLI
//
// Binary: tracker
// Usage: tracker [COMMAND]
// - No command: shows the current draft
// - basic/category/image: fill in wizard steps
// - next/back/goto: move between steps
// - submit/discard/recover: finish or drop a draft
// - shell: interactive wizard with auto-save

#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{Commands, WizardCommand};
use simple_tracker::config::TrackerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    setup_panic_handler();

    let args = cli::Cli::parse();
    let config = TrackerConfig::load()?;

    match args.command {
        Some(Commands::Shell) => cli::shell::execute(&config).await,
        Some(Commands::Config(config_args)) => {
            cli::config::execute(config_args, args.format, &config).await
        }
        Some(Commands::Wizard(command)) => cli::wizard::execute(command, args.format, &config).await,
        None => cli::wizard::execute(WizardCommand::Status, args.format, &config).await,
    }
}

fn setup_logging() {
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use tracing_subscriber::prelude::*;

    // Create log directory if it doesn't exist
    let log_dir = TrackerConfig::base_dir()
        .map(|base| base.join("logs"))
        .unwrap_or_else(|_| PathBuf::from(".simple-tracker/logs"));

    let _ = std::fs::create_dir_all(&log_dir);

    // Create JSONL log file with timestamp
    let log_file = log_dir.join(format!(
        "tracker-{}.jsonl",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "simple_tracker=info,tracker=info".into());

    // Logging must never stop the wizard from running
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_file) else {
        eprintln!("Warning: could not open log file {}", log_file.display());
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(file)
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn setup_panic_handler() {
    use tracing::error;

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs for more details.");
    }));
}
