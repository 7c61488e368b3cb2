//! Account types for tally.
//!
//! An account is a named balance. Names are unique across the store; the
//! store enforces this and reports a uniqueness violation on duplicate insert.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Money, OwnerId, SENTINEL_OWNER_ID};

/// Name of the account that collects transfer and deposit fees, unless configured otherwise.
pub const DEFAULT_FEE_COLLECTOR_NAME: &str = "Bb Marley";

/// A ledger account as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: AccountId,

    /// Unique human-readable name.
    pub name: String,

    /// Current balance. Engine operations never drive it below zero.
    pub balance: Money,

    /// Owning entity; always [`SENTINEL_OWNER_ID`] for accounts created by tally.
    pub owner_id: OwnerId,
}

impl Account {
    /// Check if the account can cover a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_funds(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// Copy of this account carrying a different balance.
    #[must_use]
    pub fn with_balance(&self, balance: Money) -> Self {
        Self {
            balance,
            ..self.clone()
        }
    }
}

/// An account that has not been inserted yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique human-readable name.
    pub name: String,

    /// Opening balance.
    pub balance: Money,

    /// Owning entity.
    pub owner_id: OwnerId,
}

impl NewAccount {
    /// A new account owned by the sentinel owner.
    #[must_use]
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            balance,
            owner_id: SENTINEL_OWNER_ID,
        }
    }
}
