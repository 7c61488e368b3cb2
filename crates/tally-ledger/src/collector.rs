//! Fee collector resolution.
//!
//! Fees are credited to a single well-known account, located by name. The
//! account is created with a zero balance the first time it is needed, and
//! its ID is cached for the lifetime of the ledger.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use tally_core::{AccountId, Money, NewAccount};
use tally_store::{AccountStore, StoreError};

use crate::error::{LedgerError, Result};

/// Lazily resolved fee collector account.
#[derive(Debug)]
pub struct FeeCollector {
    name: String,
    id: OnceCell<AccountId>,
}

impl FeeCollector {
    /// Create an unresolved collector for the account named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: OnceCell::new(),
        }
    }

    /// The collector account name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collector ID, if it has been resolved.
    #[must_use]
    pub fn cached_id(&self) -> Option<AccountId> {
        self.id.get().copied()
    }

    /// Find the collector, creating it if absent.
    ///
    /// Concurrent callers share a single resolution. A failed resolution is
    /// not cached, so the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns `FeeCollectorUnavailable` if the account can be neither found
    /// nor created.
    pub async fn resolve<S>(&self, store: &S) -> Result<AccountId>
    where
        S: AccountStore + ?Sized,
    {
        self.id
            .get_or_try_init(|| self.find_or_create(store))
            .await
            .copied()
    }

    async fn find_or_create<S>(&self, store: &S) -> Result<AccountId>
    where
        S: AccountStore + ?Sized,
    {
        if let Some(account) = store
            .find_account_by_name(&self.name)
            .await
            .map_err(unavailable)?
        {
            return Ok(account.id);
        }

        match store
            .insert_account(&NewAccount::new(self.name.as_str(), Money::ZERO))
            .await
        {
            Ok(account) => {
                info!(account_id = %account.id, name = %self.name, "Fee collector created");
                Ok(account.id)
            }
            // Another process created it between our lookup and insert.
            Err(e) if e.is_unique_violation() => {
                warn!(name = %self.name, "Fee collector created concurrently, looking it up again");
                store
                    .find_account_by_name(&self.name)
                    .await
                    .map_err(unavailable)?
                    .map(|account| account.id)
                    .ok_or_else(|| LedgerError::FeeCollectorUnavailable {
                        reason: format!("{} conflicts on insert but cannot be found", self.name),
                    })
            }
            Err(e) => Err(unavailable(e)),
        }
    }
}

fn unavailable(err: StoreError) -> LedgerError {
    LedgerError::FeeCollectorUnavailable {
        reason: err.to_string(),
    }
}
