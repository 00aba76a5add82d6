// ABOUTME: CLI argument parsing and command routing for tracker
//
// Provides command-line interface for:
// - Filling in the ticket wizard one step at a time (basic, category, image)
// - Moving between steps (next, back, goto)
// - Finishing a draft (submit, discard, recover)
// - Running the wizard interactively with auto-save (shell)

pub mod config;
pub mod shell;
pub mod util;
pub mod wizard;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use simple_tracker::models::Category;
use simple_tracker::wizard::{RecoveryDecision, WizardStep};

/// Simple Tracker - file job tickets through a guided wizard
#[derive(Parser)]
#[command(name = "tracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for commands
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Wizard(WizardCommand),

    /// Run the wizard interactively with auto-save and connectivity checks
    Shell,

    /// Show or initialise configuration
    Config(ConfigArgs),
}

/// Commands that act on the current draft. Shared by the CLI and the shell.
#[derive(Subcommand)]
pub enum WizardCommand {
    /// Show the current draft (default if no command given)
    Status,

    /// Fill in basic info (step 1)
    Basic(BasicArgs),

    /// Change a category counter (step 2)
    Category(CategoryArgs),

    /// Manage photos (step 3)
    #[command(subcommand)]
    Image(ImageCommand),

    /// Go to the next step
    Next,

    /// Go to the previous step
    Back,

    /// Jump to a step by number or name
    Goto(GotoArgs),

    /// Submit the ticket
    Submit,

    /// Throw the current draft away
    Discard,

    /// Answer the unfinished-ticket prompt
    Recover(RecoverArgs),
}

/// Arguments for the basic command
#[derive(clap::Args)]
pub struct BasicArgs {
    /// Ticket date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Use today's date
    #[arg(long, conflicts_with = "date")]
    pub today: bool,

    /// Truck identifier
    #[arg(long)]
    pub truck: Option<String>,

    /// Jobsite identifier
    #[arg(long)]
    pub jobsite: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for the category command
#[derive(clap::Args)]
pub struct CategoryArgs {
    /// Category name (hauling, spotting, rigging, teardown, cleanup, standby)
    pub category: Category,

    /// Set the counter to this value (clamped to 0..=150)
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["inc", "dec"])]
    pub set: Option<i64>,

    /// Increment by one
    #[arg(long, conflicts_with = "dec")]
    pub inc: bool,

    /// Decrement by one
    #[arg(long)]
    pub dec: bool,
}

#[derive(Subcommand)]
pub enum ImageCommand {
    /// Upload a photo and attach it to the draft
    Add {
        /// Path to the image file
        path: PathBuf,
    },

    /// Detach a photo by its temporary id
    Remove {
        /// Temporary upload id
        temp_id: String,
    },
}

/// Arguments for the goto command
#[derive(clap::Args)]
pub struct GotoArgs {
    /// Step number (1-4) or id (basic-info, categories, image-upload, confirmation)
    pub step: WizardStep,
}

/// Arguments for the recover command
#[derive(clap::Args)]
pub struct RecoverArgs {
    /// resume or discard
    pub decision: RecoveryDecision,
}

/// Arguments for the config command
#[derive(clap::Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the user config file
    #[arg(long)]
    pub init: bool,
}
