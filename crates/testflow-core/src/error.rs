//! Core error types for testflow-core.
//!
//! This module defines the error hierarchy using thiserror. I/O failures
//! from the remote test service and the state store are converted into
//! [`WizardError`] at the controller boundary, where they become a single
//! user-visible message.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::TestId;

/// Core error type for testflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote test service errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// State store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Wizard flow errors
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors talking to the remote test service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure or undecodable body
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Base URL or path could not be joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Resource does not exist on the server
    #[error("Not found: {0}")]
    NotFound(String),
}

/// State store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the state database
    #[error("Failed to open state store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Wizard flow errors.
///
/// The first four variants are the I/O failure kinds; their `Display` text is
/// what the controller exposes through `error()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Failed to load tests")]
    CatalogLoad,

    #[error("Failed to submit results for the current test")]
    Submission,

    #[error("Failed to load results")]
    ResultsAggregation,

    #[error("Failed to save progress")]
    Persistence,

    #[error("Failed to download the results PDF")]
    PdfDownload,

    #[error("First and last name are required")]
    IdentityIncomplete,

    #[error("Step {step} is not the personal data step")]
    NotOnIdentityStep { step: usize },

    #[error("Test {test_id} has not been submitted")]
    TestNotSubmitted { test_id: TestId },

    #[error("Another request is still in progress")]
    Busy,

    #[error("Test {test_id} has unanswered questions")]
    TestIncomplete { test_id: TestId },

    #[error("Step {step} is not a test step")]
    NotOnTestStep { step: usize },

    #[error("Step {step} is not the results step")]
    NotOnResultsStep { step: usize },

    #[error("Tests have not been loaded yet")]
    NotInitialized,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
