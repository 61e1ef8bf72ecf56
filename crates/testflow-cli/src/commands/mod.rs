//! Subcommand implementations.

pub mod catalog;
pub mod config;
pub mod pdf;
pub mod reset;
pub mod results;
pub mod run;
pub mod status;

use testflow_core::error::Result;
use testflow_core::{Config, HttpTestService, SqliteStateStore, WizardController};

pub type CliResult = Result<()>;

pub type Wizard = WizardController<HttpTestService, SqliteStateStore>;

/// Configuration shared by every subcommand.
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(api_url: Option<String>) -> Self {
        let mut config = Config::load_or_default();
        if let Some(url) = api_url {
            config.api.base_url = url;
        }
        Self { config }
    }

    pub fn service(&self) -> Result<HttpTestService> {
        Ok(HttpTestService::new(
            &self.config.api.base_url,
            self.config.request_timeout(),
        )?)
    }

    pub fn store(&self) -> Result<SqliteStateStore> {
        Ok(SqliteStateStore::open(&self.config.storage.state_key)?)
    }

    /// Controller wired to the configured service and on-disk store.
    pub fn wizard(&self) -> Result<Wizard> {
        Ok(WizardController::new(self.service()?, self.store()?)
            .with_scroll_delay(self.config.scroll_delay()))
    }
}
