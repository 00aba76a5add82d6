// ABOUTME: Multi-step ticket submission wizard
//
// Key components:
// - step: the four linear steps and their metadata
// - state: form data, session record and transition guards
// - validation: pure per-step validators
// - context: explicit owner of state, persistence, connectivity and toasts
// - recovery: resume/discard prompt for drafts from an earlier run

pub mod context;
pub mod error;
pub mod recovery;
pub mod state;
pub mod step;
pub mod validation;

use std::sync::Arc;
use tokio::sync::Mutex;

pub use context::{AutoSaveOutcome, WizardContext, WizardSettings};
pub use error::WizardError;
pub use recovery::{RecoveryDecision, RecoveryPrompt};
pub use state::{StepData, WizardState};
pub use step::WizardStep;
pub use validation::ValidationIssue;

/// Context shared between the front end and background tasks
pub type SharedContext<S> = Arc<Mutex<WizardContext<S>>>;

/// Wrap a context for sharing with the runtime tasks
pub fn shared<S>(ctx: WizardContext<S>) -> SharedContext<S> {
    Arc::new(Mutex::new(ctx))
}
