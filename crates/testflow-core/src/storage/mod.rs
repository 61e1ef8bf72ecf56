mod config;
pub mod state_store;

pub use config::{ApiConfig, Config, StorageConfig, UiConfig};
pub use state_store::{MemoryStateStore, SqliteStateStore, StatePersistence, DEFAULT_STATE_KEY};

use std::path::PathBuf;

/// Returns `~/.config/testflow[-dev]/` based on TESTFLOW_ENV.
///
/// Set TESTFLOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TESTFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("testflow-dev")
    } else {
        base_dir.join("testflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
