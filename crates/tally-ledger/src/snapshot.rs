//! Point-in-time view of the account table.

use std::collections::HashMap;

use tally_core::{Account, AccountId};

use crate::error::{LedgerError, Result};

/// Accounts as they were when last read from the store.
///
/// Operations validate and compute new balances against a snapshot, not
/// against fresh reads. Two callers holding the same snapshot can therefore
/// overwrite each other's balance writes; the last write wins.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    accounts: HashMap<AccountId, Account>,
}

impl Snapshot {
    /// Build a snapshot from a list of accounts.
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        accounts.into_iter().collect()
    }

    /// Look up an account.
    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Look up an account, failing with [`LedgerError::UnknownAccount`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the snapshot doesn't contain `id`.
    pub fn require(&self, id: &AccountId) -> Result<&Account> {
        self.get(id)
            .ok_or(LedgerError::UnknownAccount { account_id: *id })
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the snapshot has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over accounts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}

impl FromIterator<Account> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().map(|a| (a.id, a)).collect(),
        }
    }
}
