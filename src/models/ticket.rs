// ABOUTME: Ticket form data collected by the wizard steps and the assembled submission payload

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound for every category counter
pub const CATEGORY_MAX: u16 = 150;

/// Step 1 form data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub date: Option<NaiveDate>,
    pub truck_id: Option<String>,
    pub jobsite_id: Option<String>,
    pub notes: Option<String>,
}

impl BasicInfo {
    /// Date set and all text fields non-blank
    pub fn is_complete(&self) -> bool {
        self.date.is_some()
            && is_filled(self.truck_id.as_deref())
            && is_filled(self.jobsite_id.as_deref())
            && is_filled(self.notes.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields still missing, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if !is_filled(self.truck_id.as_deref()) {
            missing.push("truckId");
        }
        if !is_filled(self.jobsite_id.as_deref()) {
            missing.push("jobsiteId");
        }
        if !is_filled(self.notes.as_deref()) {
            missing.push("notes");
        }
        missing
    }

    /// Overlay the fields that are set in `patch`
    pub fn apply(&mut self, patch: BasicInfoPatch) {
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(truck_id) = patch.truck_id {
            self.truck_id = Some(truck_id);
        }
        if let Some(jobsite_id) = patch.jobsite_id {
            self.jobsite_id = Some(jobsite_id);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Partial update for [`BasicInfo`]; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicInfoPatch {
    pub date: Option<NaiveDate>,
    pub truck_id: Option<String>,
    pub jobsite_id: Option<String>,
    pub notes: Option<String>,
}

impl BasicInfoPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The six fixed work categories counted on a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Hauling,
    Spotting,
    Rigging,
    Teardown,
    Cleanup,
    Standby,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Self::Hauling,
            Self::Spotting,
            Self::Rigging,
            Self::Teardown,
            Self::Cleanup,
            Self::Standby,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hauling => "hauling",
            Self::Spotting => "spotting",
            Self::Rigging => "rigging",
            Self::Teardown => "teardown",
            Self::Cleanup => "cleanup",
            Self::Standby => "standby",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hauling => "Hauling",
            Self::Spotting => "Spotting",
            Self::Rigging => "Rigging",
            Self::Teardown => "Teardown",
            Self::Cleanup => "Cleanup",
            Self::Standby => "Standby",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(Category::as_str).collect();
                format!("unknown category '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Step 2 counters, one per [`Category`], each within `0..=CATEGORY_MAX`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    #[serde(default, deserialize_with = "clamped")]
    pub hauling: u16,
    #[serde(default, deserialize_with = "clamped")]
    pub spotting: u16,
    #[serde(default, deserialize_with = "clamped")]
    pub rigging: u16,
    #[serde(default, deserialize_with = "clamped")]
    pub teardown: u16,
    #[serde(default, deserialize_with = "clamped")]
    pub cleanup: u16,
    #[serde(default, deserialize_with = "clamped")]
    pub standby: u16,
}

fn clamped<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(clamp_count(raw))
}

/// Clamp arbitrary input into the valid counter range
pub fn clamp_count(value: i64) -> u16 {
    // Bounded by CATEGORY_MAX so the cast cannot truncate
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = value.clamp(0, i64::from(CATEGORY_MAX)) as u16;
    clamped
}

impl Categories {
    pub fn get(&self, category: Category) -> u16 {
        match category {
            Category::Hauling => self.hauling,
            Category::Spotting => self.spotting,
            Category::Rigging => self.rigging,
            Category::Teardown => self.teardown,
            Category::Cleanup => self.cleanup,
            Category::Standby => self.standby,
        }
    }

    fn slot(&mut self, category: Category) -> &mut u16 {
        match category {
            Category::Hauling => &mut self.hauling,
            Category::Spotting => &mut self.spotting,
            Category::Rigging => &mut self.rigging,
            Category::Teardown => &mut self.teardown,
            Category::Cleanup => &mut self.cleanup,
            Category::Standby => &mut self.standby,
        }
    }

    /// Set a counter, clamping into range. Returns the stored value.
    pub fn set(&mut self, category: Category, value: i64) -> u16 {
        let stored = clamp_count(value);
        *self.slot(category) = stored;
        stored
    }

    /// Add `delta` (may be negative), saturating at the bounds
    pub fn adjust(&mut self, category: Category, delta: i64) -> u16 {
        let current = i64::from(self.get(category));
        self.set(category, current.saturating_add(delta))
    }

    pub fn has_any(&self) -> bool {
        Category::all().iter().any(|c| self.get(*c) > 0)
    }

    pub fn total(&self) -> u32 {
        Category::all().iter().map(|c| u32::from(self.get(*c))).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u16)> + '_ {
        Category::all().iter().map(move |c| (*c, self.get(*c)))
    }
}

/// A temporarily stored upload waiting to be attached on submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub temp_id: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl ImageUpload {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Image reference sent with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedImage {
    pub temp_id: String,
    pub url: String,
}

/// Payload posted to the ticket submit endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSubmission {
    pub session_id: Uuid,
    pub device_id: Uuid,
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub truck_id: String,
    pub jobsite_id: String,
    pub notes: String,
    pub categories: Categories,
    pub images: Vec<SubmittedImage>,
    pub submitted_at: DateTime<Utc>,
}
