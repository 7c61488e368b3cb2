//! Transaction-log records.
//!
//! Every balance change writes at least one row to the transaction log. Rows
//! carry an explicit [`TransactionKind`]; deposits and withdrawals are still
//! recorded with `from == to` so the hosted schema stays compatible.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Money, TransactionId};

/// A transaction-log row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier.
    pub id: TransactionId,

    /// Account the money left (or, for deposits, the account credited).
    pub from_account_id: AccountId,

    /// Account the money reached.
    pub to_account_id: AccountId,

    /// Magnitude moved by this row. Always positive.
    pub amount: Money,

    /// What kind of movement this row records.
    pub kind: TransactionKind,

    /// Server-assigned timestamp, used for ordering only.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether the row references `account_id` on either side.
    #[must_use]
    pub fn involves(&self, account_id: &AccountId) -> bool {
        self.from_account_id == *account_id || self.to_account_id == *account_id
    }
}

/// A transaction-log row waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Source account.
    pub from_account_id: AccountId,

    /// Destination account.
    pub to_account_id: AccountId,

    /// Positive magnitude.
    pub amount: Money,

    /// Kind of movement.
    pub kind: TransactionKind,
}

impl NewTransaction {
    /// Principal leg of a transfer.
    #[must_use]
    pub const fn transfer(from: AccountId, to: AccountId, amount: Money) -> Self {
        Self {
            from_account_id: from,
            to_account_id: to,
            amount,
            kind: TransactionKind::Transfer,
        }
    }

    /// Self-referencing deposit row carrying the credited amount.
    #[must_use]
    pub const fn deposit(account: AccountId, credited: Money) -> Self {
        Self {
            from_account_id: account,
            to_account_id: account,
            amount: credited,
            kind: TransactionKind::Deposit,
        }
    }

    /// Self-referencing withdrawal row.
    #[must_use]
    pub const fn withdrawal(account: AccountId, amount: Money) -> Self {
        Self {
            from_account_id: account,
            to_account_id: account,
            amount,
            kind: TransactionKind::Withdrawal,
        }
    }

    /// Fee paid by `payer` to the fee collector.
    #[must_use]
    pub const fn fee(payer: AccountId, collector: AccountId, fee: Money) -> Self {
        Self {
            from_account_id: payer,
            to_account_id: collector,
            amount: fee,
            kind: TransactionKind::Fee,
        }
    }
}

/// Kind of a transaction-log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Principal moved between two accounts.
    Transfer,

    /// Funds added to an account, net of fee.
    Deposit,

    /// Cash taken out of an account.
    Withdrawal,

    /// Fee routed to the fee collector.
    Fee,
}

impl TransactionKind {
    /// Stable lowercase name, as stored in the `kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Fee => "fee",
        }
    }

    /// Whether rows of this kind reference the same account on both sides.
    #[must_use]
    pub const fn is_self_referencing(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdrawal)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
