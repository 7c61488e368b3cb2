//! Application state.

use std::sync::Arc;

use tally_ledger::Ledger;
use tally_store::{LedgerStore, MemoryStore, RestStore, StoreError};

use crate::config::{ServiceConfig, StoreBackend};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// A setting required by the chosen backend is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The store client could not be built.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger engine.
    pub ledger: Arc<Ledger>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over an existing store.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, config: ServiceConfig) -> Self {
        let ledger = Ledger::new(store, config.ledger_config());
        Self {
            ledger: Arc::new(ledger),
            config,
        }
    }

    /// Create the state with the store selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rest backend is selected without a URL or API
    /// key, or if its HTTP client can't be built.
    pub fn from_config(config: ServiceConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn LedgerStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store - data will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Rest => {
                let url = config
                    .store_url
                    .clone()
                    .ok_or(StartupError::MissingConfig("STORE_URL"))?;
                let api_key = config
                    .store_api_key
                    .clone()
                    .ok_or(StartupError::MissingConfig("STORE_API_KEY"))?;
                tracing::info!(store_url = %url, "Using table API store");
                Arc::new(RestStore::with_options(
                    url,
                    api_key,
                    config.rest_store_options(),
                )?)
            }
        };

        Ok(Self::new(store, config))
    }
}
