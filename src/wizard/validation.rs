// ABOUTME: Pure step validators deciding whether the wizard may move past a step

use thiserror::Error;

use super::state::StepData;
use super::step::WizardStep;
use crate::models::{BasicInfo, Categories};

/// Why a step is not complete enough to proceed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("at least one category must be greater than zero")]
    NoCategoryCounts,
}

pub fn validate_basic_info(info: &BasicInfo) -> Result<(), ValidationIssue> {
    let missing = info.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationIssue::MissingFields(missing))
    }
}

pub fn validate_categories(categories: &Categories) -> Result<(), ValidationIssue> {
    if categories.has_any() {
        Ok(())
    } else {
        Err(ValidationIssue::NoCategoryCounts)
    }
}

/// Validate one step against the collected data.
///
/// Images are optional, so the upload step always passes. The confirmation
/// step passes only when both data-entry steps do.
pub fn validate_step(step: WizardStep, data: &StepData) -> Result<(), ValidationIssue> {
    match step {
        WizardStep::BasicInfo => validate_basic_info(&data.basic_info),
        WizardStep::Categories => validate_categories(&data.categories),
        WizardStep::ImageUpload => Ok(()),
        WizardStep::Confirmation => {
            validate_basic_info(&data.basic_info)?;
            validate_categories(&data.categories)
        }
    }
}

pub fn is_step_valid(step: WizardStep, data: &StepData) -> bool {
    validate_step(step, data).is_ok()
}
