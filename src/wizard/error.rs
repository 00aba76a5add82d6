// ABOUTME: Error type shared by the wizard store, context and recovery flow

use thiserror::Error;

use super::step::WizardStep;
use super::validation::ValidationIssue;
use crate::api::ApiError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Step '{step}' is incomplete: {issue}")]
    StepIncomplete {
        step: WizardStep,
        issue: ValidationIssue,
    },

    #[error("Cannot jump to '{target}': step '{blocked_by}' is incomplete")]
    InvalidJump {
        target: WizardStep,
        blocked_by: WizardStep,
    },

    #[error("Already on the last step")]
    NoNextStep,

    #[error("No active wizard session")]
    NoSession,

    #[error("Upload failed: {0}")]
    Upload(ApiError),

    #[error("Submission failed: {0}")]
    Submission(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
