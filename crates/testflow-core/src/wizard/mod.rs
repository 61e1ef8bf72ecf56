//! The wizard: identity step, one step per test, results step.

pub mod controller;
pub mod progress;
pub mod state;
pub mod submission;

pub use controller::{PendingResults, PendingSubmission, SessionTicket, WizardController};
pub use progress::PercentageAnimation;
pub use state::{step_labels, AnswerMap, Step, WizardState};
pub use submission::{build_submission, to_wire_option};
