//! Outcomes of committed operations.

use serde::Serialize;
use tally_core::{AccountId, Money, Transaction};

/// Balance-affecting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Move funds between two accounts.
    Transfer,
    /// Add funds to an account.
    Deposit,
    /// Remove funds from an account.
    Withdrawal,
}

/// Balance of one account before and after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceChange {
    /// Account ID.
    pub account_id: AccountId,
    /// Balance in the snapshot.
    pub before: Money,
    /// Balance written.
    pub after: Money,
}

/// What a committed operation wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Operation kind.
    pub operation: Operation,
    /// Requested amount.
    pub amount: Money,
    /// Fee charged (zero for withdrawals).
    pub fee: Money,
    /// Log rows as stored.
    pub transactions: Vec<Transaction>,
    /// One entry per account whose balance was written.
    pub balances: Vec<BalanceChange>,
}

impl Receipt {
    /// Balance written for `account_id`, if the operation touched it.
    #[must_use]
    pub fn balance_after(&self, account_id: &AccountId) -> Option<Money> {
        self.balances
            .iter()
            .find(|change| &change.account_id == account_id)
            .map(|change| change.after)
    }
}
