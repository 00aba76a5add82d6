// ABOUTME: Audit logging for ticket draft lifecycle events
//
// Provides a persistent trail of what happened to each wizard session:
// creation, recovery decisions, expiry, discards and submissions. This
// helps answer "where did my half-filled ticket go?" support questions.
//
// Audit log is written to: ~/.simple-tracker/logs/audit.jsonl
// Format: JSON Lines (one JSON object per line) for easy grep/parsing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

/// Types of auditable actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Draft lifecycle
    DraftCreated,
    DraftResumed,
    DraftDiscarded,
    DraftExpired,

    // Uploads
    ImageUploaded,
    ImagesPruned,

    // Submission
    TicketSubmitted,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::DraftCreated => write!(f, "DRAFT_CREATED"),
            AuditAction::DraftResumed => write!(f, "DRAFT_RESUMED"),
            AuditAction::DraftDiscarded => write!(f, "DRAFT_DISCARDED"),
            AuditAction::DraftExpired => write!(f, "DRAFT_EXPIRED"),
            AuditAction::ImageUploaded => write!(f, "IMAGE_UPLOADED"),
            AuditAction::ImagesPruned => write!(f, "IMAGES_PRUNED"),
            AuditAction::TicketSubmitted => write!(f, "TICKET_SUBMITTED"),
        }
    }
}

/// Result of an audited action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    Success,
    Failed(String),
}

/// What triggered the audit action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTrigger {
    /// Direct user action in the wizard
    User,
    /// Recovery prompt answered on startup
    Recovery,
    /// Housekeeping such as TTL expiry
    Automatic,
}

impl std::fmt::Display for AuditTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditTrigger::User => write!(f, "user"),
            AuditTrigger::Recovery => write!(f, "recovery"),
            AuditTrigger::Automatic => write!(f, "automatic"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the action occurred
    pub timestamp: DateTime<Utc>,

    /// Type of action
    pub action: AuditAction,

    /// Result of the action
    pub result: AuditResult,

    /// Wizard session the action applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,

    /// Ticket id returned by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,

    /// Additional context/details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Trigger source
    pub trigger: AuditTrigger,
}

impl AuditEntry {
    pub fn new(action: AuditAction, result: AuditResult, trigger: AuditTrigger) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            result,
            session_id: None,
            ticket_id: None,
            details: None,
            trigger,
        }
    }

    /// Stamp the entry with a time from an injected clock
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn session(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn ticket(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Audit logger that appends to a JSONL file
#[derive(Debug)]
pub struct AuditLogger {
    writer: BufWriter<File>,
    log_path: PathBuf,
}

impl AuditLogger {
    /// Open (creating if needed) the audit log at `log_path`
    pub fn open(log_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let log_path = log_path.into();

        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        info!("Audit logging initialized: {:?}", log_path);
        Ok(Self {
            writer: BufWriter::new(file),
            log_path,
        })
    }

    /// Get the default audit log file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".simple-tracker")
            .join("logs")
            .join("audit.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn write_entry(&mut self, entry: &AuditEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Record an entry. Failures are logged, never propagated.
    pub fn record(&mut self, entry: AuditEntry) {
        info!(
            target: "audit",
            action = %entry.action,
            result = ?entry.result,
            trigger = %entry.trigger,
            session_id = ?entry.session_id,
            ticket_id = ?entry.ticket_id,
            "AUDIT: {}",
            entry.action
        );

        if let Err(e) = self.write_entry(&entry) {
            error!("Failed to write audit entry: {}", e);
        }
    }
}

/// Read all entries from an audit log, skipping unparseable lines
pub fn read_entries(path: &Path) -> std::io::Result<Vec<AuditEntry>> {
    let file = File::open(path)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => error!("Skipping malformed audit line: {}", e),
        }
    }
    Ok(entries)
}
