//! Service configuration.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tally_ledger::{DeletionPolicy, LedgerConfig};
use tally_store::schema::table;
use tally_store::RestStoreOptions;

/// Which store the service runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted table API.
    #[default]
    Rest,
    /// In-process tables; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Store backend (default: rest).
    pub store_backend: StoreBackend,

    /// Table API base URL. Required for the rest backend.
    pub store_url: Option<String>,

    /// Table API key. Required for the rest backend.
    pub store_api_key: Option<String>,

    /// Accounts table (default: "characters").
    pub accounts_table: String,

    /// Transactions table (default: "transactions").
    pub transactions_table: String,

    /// Fee collector account name (default: "Bb Marley").
    pub fee_collector_name: String,

    /// History handling on account deletion (default: cascade).
    pub deletion_policy: DeletionPolicy,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds. Also used for store calls.
    pub request_timeout_seconds: u64,
}

/// Store secrets file structure.
#[derive(Debug, Deserialize)]
struct StoreSecrets {
    url: String,
    api_key: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (store_url, store_api_key) = load_store_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            store_backend: parse_env("STORE_BACKEND").unwrap_or(defaults.store_backend),
            store_url,
            store_api_key,
            accounts_table: std::env::var("ACCOUNTS_TABLE").unwrap_or(defaults.accounts_table),
            transactions_table: std::env::var("TRANSACTIONS_TABLE")
                .unwrap_or(defaults.transactions_table),
            fee_collector_name: std::env::var("FEE_COLLECTOR_NAME")
                .unwrap_or(defaults.fee_collector_name),
            deletion_policy: parse_env("DELETION_POLICY").unwrap_or(defaults.deletion_policy),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: parse_env("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Ledger settings derived from this configuration.
    #[must_use]
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new()
            .with_fee_collector_name(self.fee_collector_name.clone())
            .with_deletion_policy(self.deletion_policy)
    }

    /// Table API client options derived from this configuration.
    #[must_use]
    pub fn rest_store_options(&self) -> RestStoreOptions {
        RestStoreOptions::default()
            .with_timeout_seconds(self.request_timeout_seconds)
            .with_accounts_table(self.accounts_table.clone())
            .with_transactions_table(self.transactions_table.clone())
    }
}

/// Parse an environment variable, warning about unparseable values.
fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
    }
    parsed
}

/// Load store credentials from file or environment.
fn load_store_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/store.json", "../.secrets/store.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StoreSecrets>(path) {
            tracing::info!(path = %path, "Loaded store secrets from file");
            return (Some(secrets.url), Some(secrets.api_key));
        }
    }

    tracing::debug!("Store secrets file not found, using environment variables");
    (
        std::env::var("STORE_URL").ok(),
        std::env::var("STORE_API_KEY").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            store_backend: StoreBackend::default(),
            store_url: None,
            store_api_key: None,
            accounts_table: table::ACCOUNTS.into(),
            transactions_table: table::TRANSACTIONS.into(),
            fee_collector_name: ledger.fee_collector_name,
            deletion_policy: ledger.deletion_policy,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
