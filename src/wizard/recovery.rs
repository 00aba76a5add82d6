// ABOUTME: Session recovery prompt for drafts left behind by an earlier run
// Summarizes the rehydrated draft and applies the user's resume/discard choice

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::state::WizardState;
use super::step::WizardStep;

/// What to do with a recovered draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryDecision {
    Resume,
    Discard,
}

impl FromStr for RecoveryDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" | "r" | "yes" | "y" => Ok(Self::Resume),
            "discard" | "d" | "no" | "n" => Ok(Self::Discard),
            other => Err(format!("expected 'resume' or 'discard', got '{}'", other)),
        }
    }
}

/// Summary shown when offering to resume a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryPrompt {
    pub session_id: Uuid,
    pub step: WizardStep,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub image_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub time_ago: String,
    pub expires_in: String,
}

impl RecoveryPrompt {
    /// Build a prompt for `state`, or `None` if there is nothing worth recovering
    pub fn from_state(state: &WizardState, now: DateTime<Utc>) -> Option<Self> {
        let session = state.session.as_ref()?;
        if !state.has_user_data() || session.is_expired(now) {
            return None;
        }
        let last_touched = state.last_modified.unwrap_or(session.created_at);

        Some(Self {
            session_id: session.session_id,
            step: state.current_step,
            completed_steps: state.completed_steps(),
            total_steps: WizardStep::total() - 1,
            image_count: state.data.images.len(),
            created_at: session.created_at,
            last_modified: state.last_modified,
            expires_at: session.expires_at,
            time_ago: format_time_ago(now - last_touched),
            expires_in: format_duration(session.remaining(now)),
        })
    }
}

impl fmt::Display for RecoveryPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unfinished ticket from {} (step {} of {}: {}, {}/{} sections complete, expires in {})",
            self.time_ago,
            self.step.number(),
            WizardStep::total(),
            self.step.title(),
            self.completed_steps,
            self.total_steps,
            self.expires_in
        )
    }
}

/// Human-readable age such as "5 minutes ago"
pub fn format_time_ago(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs < 60 {
        return "just now".to_string();
    }
    let (value, unit) = if secs < 3600 {
        (secs / 60, "minute")
    } else if secs < 86_400 {
        (secs / 3600, "hour")
    } else {
        (secs / 86_400, "day")
    };
    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Compact duration such as "3h 20m"
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
