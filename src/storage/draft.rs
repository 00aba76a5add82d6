// ABOUTME: Draft persistence with TTL-checked reads
// Serializes a snapshot of the wizard (step, step data, session) and discards it on load once expired

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DraftStorage, StorageError};
use crate::models::WizardSession;
use crate::wizard::{StepData, WizardState, WizardStep};

/// Storage key for the in-progress draft
pub const DRAFT_KEY: &str = "ticket-wizard";

/// Storage key for the per-device identifier
pub const DEVICE_ID_KEY: &str = "device-id";

/// Envelope format version; records with any other version are discarded
pub const DRAFT_FORMAT_VERSION: u32 = 1;

/// The persisted part of the wizard state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub current_step: WizardStep,
    #[serde(flatten)]
    pub data: StepData,
    pub session: WizardSession,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl DraftSnapshot {
    /// Capture the persistable parts of `state`; `None` until a session exists
    pub fn capture(state: &WizardState) -> Option<Self> {
        let session = state.session.clone()?;
        Some(Self {
            current_step: state.current_step,
            data: state.data.clone(),
            session,
            last_modified: state.last_modified,
        })
    }

    pub fn into_state(self) -> WizardState {
        WizardState {
            current_step: self.current_step,
            data: self.data,
            session: Some(self.session),
            last_modified: self.last_modified,
        }
    }
}

/// On-disk envelope around a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDraft {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: DraftSnapshot,
}

/// Result of reading the persisted draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored
    Empty,
    /// A live draft was found
    Restored(DraftSnapshot),
    /// The stored draft had expired and was removed
    Expired(WizardSession),
    /// The stored record could not be read and was removed
    Discarded(String),
}

impl LoadOutcome {
    pub fn into_snapshot(self) -> Option<DraftSnapshot> {
        match self {
            Self::Restored(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Draft persistence over an injected storage backend
#[derive(Debug)]
pub struct DraftStore<S> {
    storage: S,
}

impl<S: DraftStorage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the draft, discarding it if expired or unreadable
    pub fn load_outcome(&mut self, now: DateTime<Utc>) -> Result<LoadOutcome, StorageError> {
        let raw = match self.storage.get_item(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(LoadOutcome::Empty),
            Err(StorageError::Corrupt { reason, .. }) => {
                warn!(error = %reason, "Discarding unreadable wizard draft");
                self.storage.remove_item(DRAFT_KEY)?;
                return Ok(LoadOutcome::Discarded(reason));
            }
            Err(e) => return Err(e),
        };

        let draft: PersistedDraft = match serde_json::from_str(&raw) {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable wizard draft");
                self.storage.remove_item(DRAFT_KEY)?;
                return Ok(LoadOutcome::Discarded(e.to_string()));
            }
        };

        if draft.version != DRAFT_FORMAT_VERSION {
            warn!(
                version = draft.version,
                expected = DRAFT_FORMAT_VERSION,
                "Discarding wizard draft with unknown format version"
            );
            self.storage.remove_item(DRAFT_KEY)?;
            return Ok(LoadOutcome::Discarded(format!(
                "unsupported draft version {}",
                draft.version
            )));
        }

        let session = &draft.state.session;
        if session.is_expired(now) {
            info!(
                session_id = %session.session_id,
                expired_at = %session.expires_at,
                "Wizard draft expired, discarding"
            );
            self.storage.remove_item(DRAFT_KEY)?;
            return Ok(LoadOutcome::Expired(draft.state.session));
        }

        debug!(session_id = %session.session_id, step = %draft.state.current_step, "Loaded wizard draft");
        Ok(LoadOutcome::Restored(draft.state))
    }

    /// Read the draft; expired or unreadable records read as empty
    pub fn load(&mut self, now: DateTime<Utc>) -> Result<Option<DraftSnapshot>, StorageError> {
        Ok(self.load_outcome(now)?.into_snapshot())
    }

    pub fn save(&mut self, snapshot: &DraftSnapshot, now: DateTime<Utc>) -> Result<(), StorageError> {
        let draft = PersistedDraft {
            version: DRAFT_FORMAT_VERSION,
            saved_at: now,
            state: snapshot.clone(),
        };
        let json = serde_json::to_string_pretty(&draft)?;
        self.storage.set_item(DRAFT_KEY, &json)?;
        debug!(session_id = %snapshot.session.session_id, "Saved wizard draft");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(DRAFT_KEY)
    }

    /// Identifier for this device, created and stored on first use
    pub fn device_id(&mut self) -> Result<Uuid, StorageError> {
        let stored = match self.storage.get_item(DEVICE_ID_KEY) {
            Err(StorageError::Corrupt { reason, .. }) => {
                warn!(error = %reason, "Stored device id is unreadable, regenerating");
                None
            }
            other => other?,
        };
        if let Some(raw) = stored {
            match Uuid::parse_str(raw.trim().trim_matches('"')) {
                Ok(id) => return Ok(id),
                Err(e) => warn!(error = %e, "Stored device id is invalid, regenerating"),
            }
        }
        let id = Uuid::new_v4();
        self.storage
            .set_item(DEVICE_ID_KEY, &serde_json::to_string(&id)?)?;
        info!(device_id = %id, "Generated new device id");
        Ok(id)
    }
}
