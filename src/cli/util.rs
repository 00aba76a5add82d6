// ABOUTME: Shared CLI utilities for opening the wizard and printing its state
//
// Every command opens the same file-backed context so a draft started in
// one invocation is picked up by the next.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use super::OutputFormat;
use simple_tracker::api::HttpTicketApi;
use simple_tracker::audit::AuditLogger;
use simple_tracker::clock::SystemClock;
use simple_tracker::config::TrackerConfig;
use simple_tracker::models::{Category, ImageUpload};
use simple_tracker::notifications::Toast;
use simple_tracker::storage::{DraftStorage, FileStorage};
use simple_tracker::wizard::{RecoveryPrompt, WizardContext, WizardStep};

/// Open the wizard over the configured draft directory
pub fn open_context(config: &TrackerConfig) -> Result<WizardContext<FileStorage>> {
    let dir = config.storage_dir()?;
    let storage = FileStorage::new(dir);

    // Audit is best effort; the wizard works without it
    let audit = match AuditLogger::open(AuditLogger::default_path()) {
        Ok(logger) => Some(logger),
        Err(e) => {
            warn!(error = %e, "Audit log unavailable");
            None
        }
    };

    WizardContext::open_with(
        storage,
        config.wizard_settings(),
        Arc::new(SystemClock),
        audit,
    )
    .context("Failed to open wizard draft")
}

pub fn build_api(config: &TrackerConfig) -> Result<HttpTicketApi> {
    HttpTicketApi::new(&config.api_base_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL '{}'", config.api_base_url))
}

/// Print and clear pending notifications
pub fn flush_toasts<S: DraftStorage>(ctx: &mut WizardContext<S>) {
    for toast in ctx.take_toasts() {
        print_toast(&toast);
    }
}

pub fn print_toast(toast: &Toast) {
    println!("{toast}");
}

/// JSON output structure for the status command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub session_id: Option<String>,
    pub expires_at: Option<String>,
    pub current_step: WizardStep,
    pub step_number: usize,
    pub can_proceed: bool,
    pub completed_steps: usize,
    pub online: bool,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<RecoveryPrompt>,
}

pub fn print_status<S: DraftStorage>(ctx: &WizardContext<S>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = StatusOutput {
                session_id: ctx.session().map(|s| s.session_id.to_string()),
                expires_at: ctx.session().map(|s| s.expires_at.to_rfc3339()),
                current_step: ctx.current_step(),
                step_number: ctx.current_step().number(),
                can_proceed: ctx.can_proceed_to_next_step(),
                completed_steps: ctx.state().completed_steps(),
                online: ctx.is_online(),
                data: serde_json::to_value(ctx.data()).context("Failed to serialize draft")?,
                recovery: ctx.recovery_prompt(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("Failed to serialize status")?
            );
        }
        OutputFormat::Text => print_status_text(ctx),
    }
    Ok(())
}

fn print_status_text<S: DraftStorage>(ctx: &WizardContext<S>) {
    if let Some(prompt) = ctx.recovery_prompt() {
        println!("{prompt}");
        println!("  Resume:     tracker recover resume");
        println!("  Discard:    tracker recover discard");
        println!();
    }

    let step = ctx.current_step();
    match ctx.session() {
        Some(session) => println!(
            "Draft: {} (expires {})",
            session.short_id(),
            session.expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("Draft: none yet"),
    }
    println!("{}", "━".repeat(44));

    for s in WizardStep::all() {
        let marker = if *s == step {
            "▶"
        } else if ctx.is_step_valid(*s) {
            "✓"
        } else {
            " "
        };
        println!("{marker} {}. {}", s.number(), s.title());
    }
    println!();

    let data = ctx.data();
    match step {
        WizardStep::BasicInfo => {
            let info = &data.basic_info;
            println!("Date:         {}", info.date.map(|d| d.to_string()).unwrap_or_default());
            println!("Truck:        {}", info.truck_id.as_deref().unwrap_or(""));
            println!("Jobsite:      {}", info.jobsite_id.as_deref().unwrap_or(""));
            println!("Notes:        {}", info.notes.as_deref().unwrap_or(""));
            let missing = info.missing_fields();
            if !missing.is_empty() {
                println!();
                println!("Missing:      {}", missing.join(", "));
            }
        }
        WizardStep::Categories => {
            for category in Category::all() {
                println!("{:<13} {}", format!("{}:", category.label()), data.categories.get(*category));
            }
        }
        WizardStep::ImageUpload => print_images(&data.images),
        WizardStep::Confirmation => {
            let info = &data.basic_info;
            println!(
                "{} | truck {} | jobsite {}",
                info.date.map(|d| d.to_string()).unwrap_or_default(),
                info.truck_id.as_deref().unwrap_or(""),
                info.jobsite_id.as_deref().unwrap_or("")
            );
            for (category, count) in data.categories.iter().filter(|(_, c)| *c > 0) {
                println!("  {:<12} {}", category.label(), count);
            }
            println!("  Photos       {}", data.images.len());
        }
    }

    println!();
    if !ctx.is_online() {
        println!("Offline: changes are kept locally");
    }
    if step.next().is_some() && !ctx.can_proceed_to_next_step() {
        println!("Next is disabled until this step is complete");
    }
}

fn print_images(images: &[ImageUpload]) {
    if images.is_empty() {
        println!("No photos attached (optional)");
        return;
    }
    for image in images {
        println!(
            "  {}  {}  (expires {})",
            image.temp_id,
            image.url,
            image.expires_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
}
