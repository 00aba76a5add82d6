// ABOUTME: Core data models for ticket drafts, wizard sessions and submission payloads

pub mod session;
pub mod ticket;

pub use session::{WizardSession, DEFAULT_TTL_HOURS};
pub use ticket::{
    clamp_count, BasicInfo, BasicInfoPatch, Categories, Category, ImageUpload, SubmittedImage,
    TicketSubmission, CATEGORY_MAX,
};
