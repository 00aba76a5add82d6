// ABOUTME: Configuration management for simple-tracker
// Handles API location, wizard timings and where drafts are stored

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::storage::FileStorage;
use crate::wizard::WizardSettings;

/// Prefix for environment overrides
const ENV_PREFIX: &str = "SIMPLE_TRACKER_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Application version
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL of the tracker backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Wizard behaviour
    #[serde(default)]
    pub wizard: WizardConfig,

    /// Directory for draft files (default: ~/.simple-tracker/drafts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// User the tickets are filed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Whether the auto-save timer runs; unset means on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_enabled: Option<bool>,

    /// Seconds between auto-save ticks (default: 30)
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u64,

    /// Hours before an untouched draft session expires (default: 24)
    #[serde(default = "default_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Hours a temporary upload stays valid (default: 24)
    #[serde(default = "default_ttl_hours")]
    pub image_ttl_hours: u32,

    /// Seconds between connectivity probes in the shell (default: 15)
    #[serde(default = "default_probe_interval")]
    pub connectivity_probe_interval_secs: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_enabled: None,
            autosave_interval_secs: default_autosave_interval(),
            session_ttl_hours: default_ttl_hours(),
            image_ttl_hours: default_ttl_hours(),
            connectivity_probe_interval_secs: default_probe_interval(),
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_autosave_interval() -> u64 {
    30
}

fn default_ttl_hours() -> u32 {
    24
}

fn default_probe_interval() -> u64 {
    15
}

impl WizardConfig {
    pub fn is_autosave_enabled(&self) -> bool {
        self.autosave_enabled.unwrap_or(true)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            wizard: WizardConfig::default(),
            storage_dir: None,
            user_id: None,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from default locations, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Lowest precedence first so later files win
        for path in Self::get_config_paths().iter().rev() {
            if path.exists() {
                config.merge(Self::load_file(path)?);
            }
        }

        config.apply_env(std::env::vars());
        config.validate()?;
        Ok(config)
    }

    /// Load a single config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: TrackerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::get_user_config_dir()?;
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(config_path)
    }

    /// Get configuration file paths in order of precedence
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        // 1. Local project config
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(".simple-tracker").join("config.toml"));
        }

        // 2. User config (~/.simple-tracker/config/config.toml)
        if let Ok(config_dir) = Self::get_user_config_dir() {
            paths.push(config_dir.join("config.toml"));
        }

        // 3. System config
        paths.push(PathBuf::from("/etc/simple-tracker/config.toml"));

        paths
    }

    /// Base directory for everything the tracker writes
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".simple-tracker"))
    }

    fn get_user_config_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config"))
    }

    /// Merge another config over this one, keeping our values where the other has defaults
    pub fn merge(&mut self, other: TrackerConfig) {
        // Don't override version
        if other.api_base_url != default_api_base_url() {
            self.api_base_url = other.api_base_url;
        }
        if other.request_timeout_secs != default_request_timeout() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.storage_dir.is_some() {
            self.storage_dir = other.storage_dir;
        }
        if other.user_id.is_some() {
            self.user_id = other.user_id;
        }

        let defaults = WizardConfig::default();
        if other.wizard.autosave_enabled.is_some() {
            self.wizard.autosave_enabled = other.wizard.autosave_enabled;
        }
        if other.wizard.autosave_interval_secs != defaults.autosave_interval_secs {
            self.wizard.autosave_interval_secs = other.wizard.autosave_interval_secs;
        }
        if other.wizard.session_ttl_hours != defaults.session_ttl_hours {
            self.wizard.session_ttl_hours = other.wizard.session_ttl_hours;
        }
        if other.wizard.image_ttl_hours != defaults.image_ttl_hours {
            self.wizard.image_ttl_hours = other.wizard.image_ttl_hours;
        }
        if other.wizard.connectivity_probe_interval_secs != defaults.connectivity_probe_interval_secs {
            self.wizard.connectivity_probe_interval_secs =
                other.wizard.connectivity_probe_interval_secs;
        }
    }

    /// Apply `SIMPLE_TRACKER_*` overrides
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "API_URL" => self.api_base_url = value,
                "USER_ID" => self.user_id = Some(value).filter(|v| !v.is_empty()),
                "STORAGE_DIR" => self.storage_dir = Some(PathBuf::from(value)),
                _ => debug!(%key, "Ignoring unknown environment override"),
            }
        }
    }

    /// Reject settings the wizard cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid api_base_url '{}'", self.api_base_url))?;
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if self.wizard.autosave_interval_secs == 0 {
            anyhow::bail!("wizard.autosave_interval_secs must be greater than zero");
        }
        if self.wizard.session_ttl_hours == 0 {
            anyhow::bail!("wizard.session_ttl_hours must be greater than zero");
        }
        if self.wizard.image_ttl_hours == 0 {
            anyhow::bail!("wizard.image_ttl_hours must be greater than zero");
        }
        if self.wizard.connectivity_probe_interval_secs == 0 {
            anyhow::bail!("wizard.connectivity_probe_interval_secs must be greater than zero");
        }
        Ok(())
    }

    /// Where drafts are stored
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileStorage::default_dir().context("Could not determine home directory"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.wizard.autosave_interval_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.wizard.connectivity_probe_interval_secs)
    }

    /// Settings handed to the wizard context
    pub fn wizard_settings(&self) -> WizardSettings {
        WizardSettings {
            session_ttl: ChronoDuration::hours(i64::from(self.wizard.session_ttl_hours)),
            image_ttl: ChronoDuration::hours(i64::from(self.wizard.image_ttl_hours)),
            user_id: self.user_id.clone(),
            autosave_enabled: self.wizard.is_autosave_enabled(),
        }
    }
}
