// ABOUTME: Steps of the ticket wizard and their ordering
// Linear flow: basic-info -> categories -> image-upload -> confirmation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Steps in the ticket submission wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Categories,
    ImageUpload,
    Confirmation,
}

impl WizardStep {
    /// Get all steps in order
    pub fn all() -> &'static [WizardStep] {
        &[
            Self::BasicInfo,
            Self::Categories,
            Self::ImageUpload,
            Self::Confirmation,
        ]
    }

    /// Get the step number (1-indexed for display)
    pub fn number(&self) -> usize {
        match self {
            Self::BasicInfo => 1,
            Self::Categories => 2,
            Self::ImageUpload => 3,
            Self::Confirmation => 4,
        }
    }

    /// Get the total number of steps
    pub fn total() -> usize {
        4
    }

    /// Identifier used in persisted snapshots and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::BasicInfo => "basic-info",
            Self::Categories => "categories",
            Self::ImageUpload => "image-upload",
            Self::Confirmation => "confirmation",
        }
    }

    /// Get display title for this step
    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Categories => "Categories",
            Self::ImageUpload => "Images",
            Self::Confirmation => "Confirm",
        }
    }

    /// Get description for this step
    pub fn description(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Date, truck, jobsite and notes",
            Self::Categories => "How much work went into each category?",
            Self::ImageUpload => "Attach photos from the jobsite (optional)",
            Self::Confirmation => "Review and submit the ticket",
        }
    }

    /// Get the next step, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::BasicInfo => Some(Self::Categories),
            Self::Categories => Some(Self::ImageUpload),
            Self::ImageUpload => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// Get the previous step, if any
    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::BasicInfo => None,
            Self::Categories => Some(Self::BasicInfo),
            Self::ImageUpload => Some(Self::Categories),
            Self::Confirmation => Some(Self::ImageUpload),
        }
    }

    /// Steps that come before this one
    pub fn predecessors(self) -> impl Iterator<Item = WizardStep> {
        Self::all().iter().copied().take_while(move |s| *s < self)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if let Ok(n) = needle.parse::<usize>() {
            return Self::all()
                .iter()
                .copied()
                .find(|step| step.number() == n)
                .ok_or_else(|| format!("step number must be 1-{}", Self::total()));
        }
        Self::all()
            .iter()
            .copied()
            .find(|step| step.id() == needle)
            .ok_or_else(|| format!("unknown step '{}'", s))
    }
}
