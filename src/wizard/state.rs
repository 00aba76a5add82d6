// ABOUTME: State store for the ticket wizard
// Tracks current step, per-step form data and the session record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::WizardError;
use super::step::WizardStep;
use super::validation::{self, ValidationIssue};
use crate::models::{
    BasicInfo, BasicInfoPatch, Categories, Category, ImageUpload, SubmittedImage,
    TicketSubmission, WizardSession,
};

/// Form data collected across the wizard steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepData {
    #[serde(default)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub images: Vec<ImageUpload>,
}

impl StepData {
    /// Whether the user has entered anything at all
    pub fn has_user_data(&self) -> bool {
        !self.basic_info.is_empty() || self.categories.has_any() || !self.images.is_empty()
    }
}

/// Full wizard state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    /// Current step in the wizard
    pub current_step: WizardStep,
    /// Data entered so far
    pub data: StepData,
    /// Session record, created on first interaction
    pub session: Option<WizardSession>,
    /// When the state was last mutated
    pub last_modified: Option<DateTime<Utc>>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = Some(now);
    }

    pub fn set_basic_info(&mut self, info: BasicInfo) {
        self.data.basic_info = info;
    }

    pub fn update_basic_info(&mut self, patch: BasicInfoPatch) {
        self.data.basic_info.apply(patch);
    }

    /// Set a category counter, clamped into range. Returns the stored value.
    pub fn set_category(&mut self, category: Category, value: i64) -> u16 {
        self.data.categories.set(category, value)
    }

    pub fn adjust_category(&mut self, category: Category, delta: i64) -> u16 {
        self.data.categories.adjust(category, delta)
    }

    /// Add an upload. Returns false if its temp id is already attached.
    pub fn add_image(&mut self, image: ImageUpload) -> bool {
        if self.data.images.iter().any(|i| i.temp_id == image.temp_id) {
            return false;
        }
        self.data.images.push(image);
        true
    }

    pub fn remove_image(&mut self, temp_id: &str) -> bool {
        let before = self.data.images.len();
        self.data.images.retain(|i| i.temp_id != temp_id);
        self.data.images.len() != before
    }

    /// Drop uploads whose temporary storage has lapsed, returning them
    pub fn prune_expired_images(&mut self, now: DateTime<Utc>) -> Vec<ImageUpload> {
        let (expired, live): (Vec<_>, Vec<_>) = self
            .data
            .images
            .drain(..)
            .partition(|i| i.is_expired(now));
        self.data.images = live;
        expired
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        validation::is_step_valid(step, &self.data)
    }

    pub fn validate_step(&self, step: WizardStep) -> Result<(), ValidationIssue> {
        validation::validate_step(step, &self.data)
    }

    /// Can we go to the next step?
    pub fn can_proceed_to_next_step(&self) -> bool {
        self.current_step.next().is_some() && self.is_step_valid(self.current_step)
    }

    /// Move to the next step if the current one validates
    pub fn next_step(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.current_step.next().ok_or(WizardError::NoNextStep)?;
        self.validate_step(self.current_step)
            .map_err(|issue| WizardError::StepIncomplete {
                step: self.current_step,
                issue,
            })?;
        self.current_step = next;
        Ok(next)
    }

    /// Move to the previous step, if any
    pub fn previous_step(&mut self) -> Option<WizardStep> {
        let prev = self.current_step.previous()?;
        self.current_step = prev;
        Some(prev)
    }

    /// Jump to `target`. Going back is always allowed; going forward
    /// requires every step before `target` to validate.
    pub fn go_to_step(&mut self, target: WizardStep) -> Result<(), WizardError> {
        if target > self.current_step {
            if let Some(blocked_by) = target.predecessors().find(|s| !self.is_step_valid(*s)) {
                return Err(WizardError::InvalidJump { target, blocked_by });
            }
        }
        self.current_step = target;
        Ok(())
    }

    pub fn has_user_data(&self) -> bool {
        self.data.has_user_data()
    }

    /// Steps that currently validate, for progress display
    pub fn completed_steps(&self) -> usize {
        WizardStep::all()
            .iter()
            .filter(|s| **s != WizardStep::Confirmation && self.is_step_valid(**s))
            .count()
    }

    /// Reset all step data and session fields
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Assemble the submit payload. Expired uploads are left out.
    pub fn build_submission(&self, now: DateTime<Utc>) -> Result<TicketSubmission, WizardError> {
        self.validate_step(WizardStep::Confirmation)
            .map_err(|issue| WizardError::StepIncomplete {
                step: WizardStep::Confirmation,
                issue,
            })?;
        let session = self.session.as_ref().ok_or(WizardError::NoSession)?;
        let info = &self.data.basic_info;

        // Validation guarantees every BasicInfo field is present
        let (Some(date), Some(truck_id), Some(jobsite_id), Some(notes)) = (
            info.date,
            info.truck_id.clone(),
            info.jobsite_id.clone(),
            info.notes.clone(),
        ) else {
            return Err(WizardError::StepIncomplete {
                step: WizardStep::BasicInfo,
                issue: ValidationIssue::MissingFields(info.missing_fields()),
            });
        };

        Ok(TicketSubmission {
            session_id: session.session_id,
            device_id: session.device_id,
            user_id: session.user_id.clone(),
            date,
            truck_id: truck_id.trim().to_string(),
            jobsite_id: jobsite_id.trim().to_string(),
            notes: notes.trim().to_string(),
            categories: self.data.categories,
            images: self
                .data
                .images
                .iter()
                .filter(|i| !i.is_expired(now))
                .map(|i| SubmittedImage {
                    temp_id: i.temp_id.clone(),
                    url: i.url.clone(),
                })
                .collect(),
            submitted_at: now,
        })
    }
}
