// ABOUTME: Wizard context: the explicit owner of wizard state, persistence and notifications
//
// Every front-end handler receives a `WizardContext` instead of reaching
// for global state. Each mutation timestamps the state and persists a
// snapshot through the injected `DraftStorage`; sessions are created on
// the first mutation and dropped on submit, discard or expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::WizardError;
use super::recovery::{RecoveryDecision, RecoveryPrompt};
use super::state::{StepData, WizardState};
use super::step::WizardStep;
use crate::api::TicketApi;
use crate::audit::{AuditAction, AuditEntry, AuditLogger, AuditResult, AuditTrigger};
use crate::clock::{Clock, SystemClock};
use crate::models::{
    BasicInfo, BasicInfoPatch, Category, ImageUpload, TicketSubmission, WizardSession,
    DEFAULT_TTL_HOURS,
};
use crate::notifications::{Toast, ToastQueue};
use crate::runtime::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::storage::draft::LoadOutcome;
use crate::storage::{DraftSnapshot, DraftStorage, DraftStore};

/// Tunables for a wizard context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub session_ttl: Duration,
    pub image_ttl: Duration,
    pub user_id: Option<String>,
    pub autosave_enabled: bool,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(DEFAULT_TTL_HOURS),
            image_ttl: Duration::hours(DEFAULT_TTL_HOURS),
            user_id: None,
            autosave_enabled: true,
        }
    }
}

/// Outcome of one auto-save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveOutcome {
    Saved,
    SkippedOffline,
    SkippedDisabled,
    SkippedNoSession,
}

#[derive(Debug)]
pub struct WizardContext<S> {
    state: WizardState,
    store: DraftStore<S>,
    settings: WizardSettings,
    device_id: Uuid,
    connectivity: ConnectivityMonitor,
    toasts: ToastQueue,
    clock: Arc<dyn Clock>,
    audit: Option<AuditLogger>,
    pending_recovery: bool,
}

impl<S: DraftStorage> WizardContext<S> {
    /// Open a context over `storage`, rehydrating any live draft
    pub fn open(storage: S, settings: WizardSettings) -> Result<Self, WizardError> {
        Self::open_with_clock(storage, settings, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        storage: S,
        settings: WizardSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WizardError> {
        Self::open_with(storage, settings, clock, None)
    }

    /// Open with every dependency supplied, including an optional audit log
    pub fn open_with(
        storage: S,
        settings: WizardSettings,
        clock: Arc<dyn Clock>,
        audit: Option<AuditLogger>,
    ) -> Result<Self, WizardError> {
        let mut store = DraftStore::new(storage);
        let device_id = store.device_id()?;
        let now = clock.now();

        let mut ctx = Self {
            state: WizardState::new(),
            store,
            settings,
            device_id,
            connectivity: ConnectivityMonitor::default(),
            toasts: ToastQueue::default(),
            clock,
            audit,
            pending_recovery: false,
        };

        match ctx.store.load_outcome(now)? {
            LoadOutcome::Restored(snapshot) => {
                ctx.state = snapshot.into_state();
                ctx.pending_recovery = ctx.state.has_user_data();
                info!(
                    session_id = ?ctx.state.session.as_ref().map(|s| s.session_id),
                    step = %ctx.state.current_step,
                    "Rehydrated wizard draft"
                );
            }
            LoadOutcome::Expired(session) => {
                // Expiry reads as "no session"; nothing is surfaced to the user
                ctx.audit_record(
                    AuditEntry::new(AuditAction::DraftExpired, AuditResult::Success, AuditTrigger::Automatic)
                        .session(session.session_id),
                );
            }
            LoadOutcome::Discarded(reason) => {
                debug!(%reason, "Started with empty wizard after discarding stored draft");
            }
            LoadOutcome::Empty => {}
        }

        Ok(ctx)
    }

    fn audit_record(&mut self, entry: AuditEntry) {
        let now = self.clock.now();
        if let Some(audit) = self.audit.as_mut() {
            audit.record(entry.at(now));
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // === Accessors ===

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn data(&self) -> &StepData {
        &self.state.data
    }

    pub fn session(&self) -> Option<&WizardSession> {
        self.state.session.as_ref()
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub fn device_id(&self) -> Uuid {
        self.device_id
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        self.state.is_step_valid(step)
    }

    pub fn can_proceed_to_next_step(&self) -> bool {
        self.state.can_proceed_to_next_step()
    }

    // === Mutation plumbing ===

    /// Drop the session if it has expired. Expiry reads as "no session":
    /// the state starts over without surfacing an error.
    fn expire_if_needed(&mut self) {
        let now = self.now();
        let Some(session) = self.state.session.as_ref() else {
            return;
        };
        if !session.is_expired(now) {
            return;
        }
        let expired_id = session.session_id;
        info!(session_id = %expired_id, "Wizard session expired, starting over");
        self.state.clear();
        self.pending_recovery = false;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove expired draft");
        }
        self.audit_record(
            AuditEntry::new(AuditAction::DraftExpired, AuditResult::Success, AuditTrigger::Automatic)
                .session(expired_id),
        );
    }

    /// Make sure a live session exists before a data mutation
    fn begin_mutation(&mut self) {
        self.expire_if_needed();
        self.pending_recovery = false;
        if self.state.session.is_some() {
            return;
        }

        let session = WizardSession::start(
            self.now(),
            self.settings.session_ttl,
            self.device_id,
            self.settings.user_id.clone(),
        );
        info!(session_id = %session.session_id, expires_at = %session.expires_at, "Started wizard session");
        self.audit_record(
            AuditEntry::new(AuditAction::DraftCreated, AuditResult::Success, AuditTrigger::User)
                .session(session.session_id),
        );
        self.state.session = Some(session);
    }

    /// Timestamp the state and persist a snapshot
    fn commit(&mut self, auto_saved: bool) -> Result<(), WizardError> {
        let now = self.now();
        if !auto_saved {
            self.state.touch(now);
        }
        if let Some(session) = self.state.session.as_mut() {
            session.auto_saved = auto_saved;
        }
        match DraftSnapshot::capture(&self.state) {
            Some(snapshot) => self.store.save(&snapshot, now)?,
            None => debug!("No session yet, nothing to persist"),
        }
        Ok(())
    }

    // === Step 1: basic info ===

    pub fn set_basic_info(&mut self, info: BasicInfo) -> Result<(), WizardError> {
        self.begin_mutation();
        self.state.set_basic_info(info);
        self.commit(false)
    }

    pub fn update_basic_info(&mut self, patch: BasicInfoPatch) -> Result<(), WizardError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.begin_mutation();
        self.state.update_basic_info(patch);
        self.commit(false)
    }

    // === Step 2: categories ===

    /// Set a counter (clamped to range), returning the stored value
    pub fn set_category(&mut self, category: Category, value: i64) -> Result<u16, WizardError> {
        self.begin_mutation();
        let stored = self.state.set_category(category, value);
        self.commit(false)?;
        Ok(stored)
    }

    pub fn increment_category(&mut self, category: Category) -> Result<u16, WizardError> {
        self.adjust_category(category, 1)
    }

    pub fn decrement_category(&mut self, category: Category) -> Result<u16, WizardError> {
        self.adjust_category(category, -1)
    }

    pub fn adjust_category(&mut self, category: Category, delta: i64) -> Result<u16, WizardError> {
        self.begin_mutation();
        let stored = self.state.adjust_category(category, delta);
        self.commit(false)?;
        Ok(stored)
    }

    // === Step 3: images ===

    /// Attach an already uploaded image. Returns false for a duplicate.
    pub fn add_image(&mut self, image: ImageUpload) -> Result<bool, WizardError> {
        self.begin_mutation();
        let added = self.state.add_image(image);
        self.commit(false)?;
        Ok(added)
    }

    pub fn remove_image(&mut self, temp_id: &str) -> Result<bool, WizardError> {
        if !self.state.data.images.iter().any(|i| i.temp_id == temp_id) {
            return Ok(false);
        }
        self.begin_mutation();
        let removed = self.state.remove_image(temp_id);
        self.commit(false)?;
        Ok(removed)
    }

    /// Upload image bytes to temporary storage and attach the result
    pub async fn upload_image<A: TicketApi>(
        &mut self,
        api: &A,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageUpload, WizardError> {
        let response = match api.upload_temp_image(file_name, bytes).await {
            Ok(response) => response,
            Err(e) => {
                self.toasts.error(format!("Failed to upload {}: {}", file_name, e));
                return Err(WizardError::Upload(e));
            }
        };

        let image = ImageUpload {
            expires_at: response
                .expires_at
                .unwrap_or_else(|| self.now() + self.settings.image_ttl),
            temp_id: response.temp_id,
            url: response.url,
        };
        self.add_image(image.clone())?;

        let session_id = self.state.session.as_ref().map(|s| s.session_id);
        let mut entry = AuditEntry::new(AuditAction::ImageUploaded, AuditResult::Success, AuditTrigger::User)
            .details(format!("{} -> {}", file_name, image.temp_id));
        entry.session_id = session_id;
        self.audit_record(entry);

        Ok(image)
    }

    // === Navigation ===

    pub fn next_step(&mut self) -> Result<WizardStep, WizardError> {
        self.expire_if_needed();
        // Validation failures stay silent; the caller keeps "next" disabled
        let next = self.state.next_step()?;
        self.pending_recovery = false;
        self.commit(false)?;
        Ok(next)
    }

    pub fn previous_step(&mut self) -> Result<Option<WizardStep>, WizardError> {
        self.expire_if_needed();
        let Some(prev) = self.state.previous_step() else {
            return Ok(None);
        };
        self.pending_recovery = false;
        self.commit(false)?;
        Ok(Some(prev))
    }

    pub fn go_to_step(&mut self, target: WizardStep) -> Result<(), WizardError> {
        self.expire_if_needed();
        if target == self.state.current_step {
            return Ok(());
        }
        self.state.go_to_step(target)?;
        self.pending_recovery = false;
        self.commit(false)
    }

    // === Persistence ===

    /// Persist now, as the user asked to save
    pub fn save(&mut self) -> Result<(), WizardError> {
        self.commit(false)
    }

    /// The auto-save routine: a no-op while offline or disabled
    pub fn auto_save(&mut self) -> Result<AutoSaveOutcome, WizardError> {
        if !self.settings.autosave_enabled {
            return Ok(AutoSaveOutcome::SkippedDisabled);
        }
        self.expire_if_needed();
        if !self.connectivity.is_online() {
            debug!("Offline, skipping auto-save");
            return Ok(AutoSaveOutcome::SkippedOffline);
        }
        if self.state.session.is_none() {
            return Ok(AutoSaveOutcome::SkippedNoSession);
        }
        self.commit(true)?;
        Ok(AutoSaveOutcome::Saved)
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.settings.autosave_enabled = enabled;
    }

    /// Reset all step data and session fields and drop the persisted draft
    pub fn clear(&mut self) -> Result<(), WizardError> {
        self.discard_draft(AuditTrigger::User)
    }

    fn discard_draft(&mut self, trigger: AuditTrigger) -> Result<(), WizardError> {
        let session_id = self.state.session.as_ref().map(|s| s.session_id);
        self.state.clear();
        self.pending_recovery = false;
        self.store.clear()?;

        if let Some(session_id) = session_id {
            info!(%session_id, "Wizard draft discarded");
            self.audit_record(
                AuditEntry::new(AuditAction::DraftDiscarded, AuditResult::Success, trigger)
                    .session(session_id),
            );
        }
        Ok(())
    }

    // === Recovery ===

    /// The pending resume/discard prompt for a rehydrated draft
    pub fn recovery_prompt(&self) -> Option<RecoveryPrompt> {
        if !self.pending_recovery {
            return None;
        }
        RecoveryPrompt::from_state(&self.state, self.now())
    }

    pub fn resolve_recovery(&mut self, decision: RecoveryDecision) -> Result<(), WizardError> {
        if !self.pending_recovery {
            return Ok(());
        }
        self.pending_recovery = false;
        let session_id = self.state.session.as_ref().map(|s| s.session_id);

        match decision {
            RecoveryDecision::Resume => {
                if let Some(session_id) = session_id {
                    self.audit_record(
                        AuditEntry::new(AuditAction::DraftResumed, AuditResult::Success, AuditTrigger::Recovery)
                            .session(session_id),
                    );
                }
                self.toasts.info("Resumed your unfinished ticket");
                Ok(())
            }
            RecoveryDecision::Discard => {
                self.discard_draft(AuditTrigger::Recovery)?;
                self.toasts.info("Discarded unfinished ticket");
                Ok(())
            }
        }
    }

    // === Connectivity ===

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Apply a connectivity observation, toasting on transitions only
    pub fn set_online(&mut self, online: bool) -> Option<ConnectivityEvent> {
        let event = self.connectivity.update(online)?;
        match event {
            ConnectivityEvent::WentOffline => self
                .toasts
                .warning("You are offline. Changes are saved locally."),
            ConnectivityEvent::Restored => self.toasts.success("Connection restored"),
        }
        Some(event)
    }

    pub fn subscribe_connectivity(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.connectivity.subscribe()
    }

    // === Notifications ===

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    // === Submission ===

    pub fn build_submission(&self) -> Result<TicketSubmission, WizardError> {
        self.state.build_submission(self.now())
    }

    /// Submit the ticket. Success clears the session; failure leaves the
    /// state untouched for a retry.
    pub async fn submit<A: TicketApi>(&mut self, api: &A) -> Result<String, WizardError> {
        self.expire_if_needed();

        let now = self.now();
        let expired = self.state.prune_expired_images(now);
        if !expired.is_empty() {
            warn!(count = expired.len(), "Dropping expired temporary uploads");
            self.toasts.warning(format!(
                "{} photo(s) expired and were removed; re-attach them if needed",
                expired.len()
            ));
            let mut entry = AuditEntry::new(AuditAction::ImagesPruned, AuditResult::Success, AuditTrigger::Automatic)
                .details(
                    expired
                        .iter()
                        .map(|i| i.temp_id.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                );
            entry.session_id = self.state.session.as_ref().map(|s| s.session_id);
            self.audit_record(entry);
            self.commit(false)?;
        }

        let submission = self.state.build_submission(now)?;
        let session_id = submission.session_id;

        // No state changes across the await; a dropped future leaves the draft as it was
        match api.submit_ticket(&submission).await {
            Ok(response) => {
                self.audit_record(
                    AuditEntry::new(AuditAction::TicketSubmitted, AuditResult::Success, AuditTrigger::User)
                        .session(session_id)
                        .ticket(response.ticket_id.clone()),
                );
                self.state.clear();
                self.pending_recovery = false;
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Ticket submitted but the local draft could not be removed");
                }
                self.toasts
                    .success(format!("Ticket {} submitted", response.ticket_id));
                Ok(response.ticket_id)
            }
            Err(e) => {
                self.audit_record(
                    AuditEntry::new(
                        AuditAction::TicketSubmitted,
                        AuditResult::Failed(e.to_string()),
                        AuditTrigger::User,
                    )
                    .session(session_id),
                );
                self.toasts
                    .error(format!("Failed to submit ticket: {}. Your draft is saved.", e));
                Err(WizardError::Submission(e))
            }
        }
    }
}
