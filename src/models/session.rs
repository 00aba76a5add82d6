// ABOUTME: Wizard session record tracking identity, device and expiry of an in-progress ticket draft

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lifetime of a wizard session and of temporary uploads
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Session metadata for one in-progress ticket draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub device_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Whether the last persisted snapshot came from the auto-save timer
    #[serde(default)]
    pub auto_saved: bool,
}

impl WizardSession {
    /// Start a session at `now` that expires after `ttl`
    pub fn start(now: DateTime<Utc>, ttl: Duration, device_id: Uuid, user_id: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + ttl,
            device_id,
            user_id,
            auto_saved: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }

    /// Short form of the session id for display
    pub fn short_id(&self) -> String {
        self.session_id.to_string().chars().take(8).collect()
    }
}
