// ABOUTME: Interactive wizard shell with auto-save and live connectivity status
//
// Mounts the wizard runtime for the lifetime of the shell: the auto-save
// timer and the connectivity probe run in the background while commands
// are read from stdin. Toasts are printed as they arrive.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::util::{build_api, flush_toasts, open_context, print_status};
use super::wizard::apply;
use super::{OutputFormat, WizardCommand};
use simple_tracker::config::TrackerConfig;
use simple_tracker::runtime::{ConnectivityProbe, WizardRuntime};
use simple_tracker::wizard::shared;

/// One line typed at the shell prompt
#[derive(Parser)]
#[command(name = "tracker>", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Wizard(WizardCommand),

    /// Turn auto-save on or off for this shell
    Autosave { state: Toggle },

    /// Leave the shell (the draft is kept)
    #[command(alias = "exit")]
    Quit,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

/// Run the interactive shell until EOF or `quit`
pub async fn execute(config: &TrackerConfig) -> Result<()> {
    let ctx = shared(open_context(config)?);
    let api = build_api(config)?;

    let (signal_tx, signal_rx) = watch::channel(true);
    let mut probe = ConnectivityProbe::new(config.probe_interval());
    probe.start(api.clone(), signal_tx);

    let mut runtime = WizardRuntime::mount(&ctx, config.autosave_interval(), signal_rx);
    let mut events = ctx.lock().await.subscribe_connectivity();
    let mut listening = true;

    {
        let mut guard = ctx.lock().await;
        print_status(&*guard, OutputFormat::Text)?;
        flush_toasts(&mut *guard);
    }
    println!();
    println!("Type 'help' for commands, 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let words = split_line(&line);
                if words.is_empty() {
                    continue;
                }

                let parsed = match ShellLine::try_parse_from(words) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        // Help output arrives as an "error" too
                        let _ = e.print();
                        continue;
                    }
                };

                let mut guard = ctx.lock().await;
                match parsed.command {
                    ShellCommand::Quit => break,
                    ShellCommand::Autosave { state } => {
                        let enabled = matches!(state, Toggle::On);
                        guard.set_autosave_enabled(enabled);
                        println!("Auto-save {}", if enabled { "on" } else { "off" });
                    }
                    ShellCommand::Wizard(command) => {
                        if let Err(e) = apply(&mut *guard, &api, command, OutputFormat::Text).await {
                            println!("Error: {e:#}");
                        }
                    }
                }
                flush_toasts(&mut *guard);
            }
            event = events.recv(), if listening => {
                match event {
                    Ok(event) => {
                        debug!(?event, "Connectivity changed");
                        println!();
                        flush_toasts(&mut *ctx.lock().await);
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => listening = false,
                }
            }
        }
    }

    runtime.unmount().await;
    probe.stop().await;

    let mut guard = ctx.lock().await;
    guard.save().context("Failed to save draft on exit")?;
    flush_toasts(&mut *guard);
    info!("Shell closed");
    Ok(())
}

fn prompt() -> Result<()> {
    print!("tracker> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// Split a command line into words, keeping quoted text together
fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
