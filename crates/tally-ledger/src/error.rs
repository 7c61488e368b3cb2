//! Ledger error types.

use std::fmt;

use serde::Serialize;
use tally_core::{AccountId, Money, MoneyError};
use tally_store::StoreError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// The write that failed inside a multi-write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStage {
    /// Writing account balances.
    Balances,
    /// Deleting the account's transaction history.
    DeleteHistory,
    /// Deleting the account row.
    DeleteAccount,
}

impl WriteStage {
    /// Stable snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balances => "balances",
            Self::DeleteHistory => "delete_history",
            Self::DeleteAccount => "delete_account",
        }
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger operation errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount is zero or negative.
    #[error("invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount {
        /// The rejected amount.
        amount: Money,
    },

    /// Account name is empty.
    #[error("account name must not be empty")]
    EmptyName,

    /// Initial balance is negative.
    #[error("initial balance must not be negative: {balance}")]
    NegativeBalance {
        /// The rejected balance.
        balance: Money,
    },

    /// Sender cannot cover amount plus fee.
    #[error("insufficient funds: balance={available}, required={required}")]
    InsufficientFunds {
        /// Sender balance.
        available: Money,
        /// Amount plus fee.
        required: Money,
    },

    /// Account cannot cover a withdrawal.
    #[error("insufficient balance: balance={available}, requested={requested}")]
    InsufficientBalance {
        /// Account balance.
        available: Money,
        /// Requested withdrawal.
        requested: Money,
    },

    /// An account with this name already exists.
    #[error("duplicate account: {name}")]
    DuplicateAccount {
        /// The conflicting name.
        name: String,
    },

    /// Account is not known.
    #[error("account not found: {account_id}")]
    UnknownAccount {
        /// The missing account.
        account_id: AccountId,
    },

    /// The fee collector cannot be deleted.
    #[error("account {account_id} is the fee collector and cannot be deleted")]
    ProtectedAccount {
        /// The fee collector's ID.
        account_id: AccountId,
    },

    /// The fee collector could not be found or created.
    #[error("fee collector unavailable: {reason}")]
    FeeCollectorUnavailable {
        /// What went wrong.
        reason: String,
    },

    /// Amount arithmetic failed.
    #[error("amount arithmetic failed: {0}")]
    Arithmetic(#[from] MoneyError),

    /// A read, or the first write of an operation, failed. Nothing was written.
    #[error("persistence failure: {0}")]
    Persistence(#[source] StoreError),

    /// A later write failed after earlier writes succeeded.
    #[error("partial failure at {stage}: {source}")]
    PartialFailure {
        /// The write that failed.
        stage: WriteStage,
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// Account deletion failed.
    #[error("deletion failed at {stage}: {source}")]
    DeletionFailed {
        /// The step that failed.
        stage: WriteStage,
        /// Store error.
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// Whether the error was raised before any write was made.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::EmptyName
                | Self::NegativeBalance { .. }
                | Self::InsufficientFunds { .. }
                | Self::InsufficientBalance { .. }
                | Self::UnknownAccount { .. }
                | Self::ProtectedAccount { .. }
        )
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::EmptyName => "empty_name",
            Self::NegativeBalance { .. } => "negative_balance",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::DuplicateAccount { .. } => "duplicate_account",
            Self::UnknownAccount { .. } => "unknown_account",
            Self::ProtectedAccount { .. } => "protected_account",
            Self::FeeCollectorUnavailable { .. } => "fee_collector_unavailable",
            Self::Arithmetic(_) => "arithmetic",
            Self::Persistence(_) => "persistence_failure",
            Self::PartialFailure { .. } => "partial_failure",
            Self::DeletionFailed { .. } => "deletion_failed",
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err)
    }
}
