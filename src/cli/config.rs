// ABOUTME: CLI config command: show the effective configuration or write it out

use anyhow::{Context, Result};

use super::{ConfigArgs, OutputFormat};
use simple_tracker::config::TrackerConfig;

#[allow(clippy::unused_async)]
pub async fn execute(args: ConfigArgs, format: OutputFormat, config: &TrackerConfig) -> Result<()> {
    if args.init {
        let path = config.save()?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(config).context("Failed to serialize config")?
        ),
        OutputFormat::Text => {
            let storage = config
                .storage_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(unknown)".to_string());

            println!("Configuration (v{})", config.version);
            println!("{}", "━".repeat(44));
            println!("API:            {}", config.api_base_url);
            println!("Timeout:        {}s", config.request_timeout_secs);
            println!("User:           {}", config.user_id.as_deref().unwrap_or("-"));
            println!("Drafts:         {storage}");
            println!(
                "Auto-save:      {} (every {}s)",
                if config.wizard.is_autosave_enabled() { "on" } else { "off" },
                config.wizard.autosave_interval_secs
            );
            println!("Session TTL:    {}h", config.wizard.session_ttl_hours);
            println!("Photo TTL:      {}h", config.wizard.image_ttl_hours);
            println!("Probe interval: {}s", config.wizard.connectivity_probe_interval_secs);
        }
    }
    Ok(())
}
