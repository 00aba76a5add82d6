// ABOUTME: Wizard commands shared by one-shot CLI invocations and the interactive shell
//
// Each command maps onto one WizardContext operation; the context persists
// the draft, so the next invocation resumes where this one stopped.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

use super::util::{build_api, flush_toasts, open_context, print_status};
use super::{BasicArgs, CategoryArgs, ImageCommand, OutputFormat, WizardCommand};
use simple_tracker::api::TicketApi;
use simple_tracker::config::TrackerConfig;
use simple_tracker::models::BasicInfoPatch;
use simple_tracker::storage::DraftStorage;
use simple_tracker::wizard::{RecoveryDecision, WizardContext, WizardError};

/// Execute a single wizard command against the stored draft
pub async fn execute(command: WizardCommand, format: OutputFormat, config: &TrackerConfig) -> Result<()> {
    let mut ctx = open_context(config)?;
    let api = build_api(config)?;

    let result = apply(&mut ctx, &api, command, format).await;
    flush_toasts(&mut ctx);
    result
}

/// Apply one command to an open context
pub async fn apply<S, A>(
    ctx: &mut WizardContext<S>,
    api: &A,
    command: WizardCommand,
    format: OutputFormat,
) -> Result<()>
where
    S: DraftStorage,
    A: TicketApi,
{
    match command {
        WizardCommand::Status => print_status(ctx, format),
        WizardCommand::Basic(args) => basic(ctx, args),
        WizardCommand::Category(args) => category(ctx, args),
        WizardCommand::Image(ImageCommand::Add { path }) => add_image(ctx, api, &path).await,
        WizardCommand::Image(ImageCommand::Remove { temp_id }) => {
            if ctx.remove_image(&temp_id)? {
                println!("Removed photo {temp_id}");
            } else {
                println!("No photo with id {temp_id}");
            }
            Ok(())
        }
        WizardCommand::Next => {
            let step = ctx.next_step()?;
            println!("Step {}: {}", step.number(), step.title());
            Ok(())
        }
        WizardCommand::Back => {
            match ctx.previous_step()? {
                Some(step) => println!("Step {}: {}", step.number(), step.title()),
                None => println!("Already on the first step"),
            }
            Ok(())
        }
        WizardCommand::Goto(args) => {
            ctx.go_to_step(args.step)?;
            println!("Step {}: {}", args.step.number(), args.step.title());
            Ok(())
        }
        WizardCommand::Submit => submit(ctx, api, format).await,
        WizardCommand::Discard => {
            ctx.clear()?;
            println!("Draft discarded");
            Ok(())
        }
        WizardCommand::Recover(args) => {
            if ctx.recovery_prompt().is_none() {
                println!("Nothing to recover");
                return Ok(());
            }
            ctx.resolve_recovery(args.decision)?;
            if args.decision == RecoveryDecision::Resume {
                print_status(ctx, format)?;
            }
            Ok(())
        }
    }
}

fn basic<S: DraftStorage>(ctx: &mut WizardContext<S>, args: BasicArgs) -> Result<()> {
    let date = if args.today {
        Some(chrono::Local::now().date_naive())
    } else {
        args.date
    };
    let patch = BasicInfoPatch {
        date,
        truck_id: args.truck,
        jobsite_id: args.jobsite,
        notes: args.notes,
    };
    if patch.is_empty() {
        bail!("Nothing to update. Pass --date, --today, --truck, --jobsite or --notes");
    }

    ctx.update_basic_info(patch)?;

    let missing = ctx.data().basic_info.missing_fields();
    if missing.is_empty() {
        println!("Basic info complete");
    } else {
        println!("Basic info saved; still missing: {}", missing.join(", "));
    }
    Ok(())
}

fn category<S: DraftStorage>(ctx: &mut WizardContext<S>, args: CategoryArgs) -> Result<()> {
    let value = match (args.set, args.inc, args.dec) {
        (Some(value), _, _) => ctx.set_category(args.category, value)?,
        (None, true, _) => ctx.increment_category(args.category)?,
        (None, false, true) => ctx.decrement_category(args.category)?,
        (None, false, false) => bail!("Pass --set <N>, --inc or --dec"),
    };
    println!("{}: {}", args.category.label(), value);
    Ok(())
}

async fn add_image<S, A>(ctx: &mut WizardContext<S>, api: &A, path: &Path) -> Result<()>
where
    S: DraftStorage,
    A: TicketApi,
{
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();

    let image = ctx.upload_image(api, &file_name, bytes).await?;
    info!(temp_id = %image.temp_id, "Attached photo");
    println!("Attached {} as {}", file_name, image.temp_id);
    Ok(())
}

async fn submit<S, A>(ctx: &mut WizardContext<S>, api: &A, format: OutputFormat) -> Result<()>
where
    S: DraftStorage,
    A: TicketApi,
{
    let ticket_id = match ctx.submit(api).await {
        Ok(ticket_id) => ticket_id,
        Err(WizardError::Submission(e)) if e.is_retryable() => {
            bail!("{e}. The draft is kept; run 'tracker submit' again once the service is reachable")
        }
        Err(e) => return Err(e.into()),
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "ticketId": ticket_id })),
        OutputFormat::Text => println!("Submitted ticket {ticket_id}"),
    }
    Ok(())
}
