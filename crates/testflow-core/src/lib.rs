//! # Testflow Core Library
//!
//! This library provides the core logic for Testflow, a sequential testing
//! wizard: it collects a respondent's identity, walks them through a series
//! of tests, submits answers to a remote test service and shows percentage
//! results. Presentation layers (the bundled CLI, or anything else) only
//! render controller state and call its commands.
//!
//! ## Architecture
//!
//! - **Wizard Controller**: step progression, answer accumulation,
//!   submission sequencing and reload recovery
//! - **Test Service**: port to the remote REST API, with an HTTP adapter
//! - **Storage**: SQLite key-value persistence of the wizard state and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`WizardController`]: Core wizard state machine
//! - [`WizardState`]: The persisted unit
//! - [`TestService`]: Trait for the remote test service
//! - [`StatePersistence`]: Trait for the local state store
//! - [`Config`]: Application configuration management

pub mod api;
pub mod error;
pub mod events;
pub mod model;
pub mod storage;
pub mod wizard;

pub use api::{HttpTestService, TestService};
pub use error::{ApiError, ConfigError, CoreError, StorageError, WizardError};
pub use events::{Event, UiCue};
pub use model::{
    Question, QuestionId, Test, TestCatalog, TestId, TestOutcome, TestResultSubmission, TestScore,
    UserData, UserDataUpdate,
};
pub use storage::{Config, MemoryStateStore, SqliteStateStore, StatePersistence};
pub use wizard::{AnswerMap, PercentageAnimation, Step, WizardController, WizardState};
