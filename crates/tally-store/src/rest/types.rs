//! Wire types for the PostgREST table API.
//!
//! Column names follow the hosted schema, which predates tally's own naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::{
    Account, AccountId, Money, NewAccount, NewTransaction, OwnerId, Transaction, TransactionId,
    TransactionKind,
};

/// A row of the accounts table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRow {
    /// Primary key.
    pub id: AccountId,
    /// Unique name.
    pub name: String,
    /// Balance; `numeric` in the database.
    pub balance: Money,
    /// Owner reference.
    pub user_id: OwnerId,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            balance: row.balance,
            owner_id: row.user_id,
        }
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            balance: account.balance,
            user_id: account.owner_id,
        }
    }
}

/// Insert payload for the accounts table (no `id`; the database assigns it).
#[derive(Debug, Clone, Serialize)]
pub struct NewAccountRow {
    /// Unique name.
    pub name: String,
    /// Opening balance.
    pub balance: Money,
    /// Owner reference.
    pub user_id: OwnerId,
}

impl From<&NewAccount> for NewAccountRow {
    fn from(account: &NewAccount) -> Self {
        Self {
            name: account.name.clone(),
            balance: account.balance,
            user_id: account.owner_id,
        }
    }
}

/// Body of a balance-only `PATCH`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BalancePatch {
    pub balance: Money,
}

/// A row of the transactions table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Primary key.
    pub id: TransactionId,
    /// Sender.
    pub from_character_id: AccountId,
    /// Recipient.
    pub to_character_id: AccountId,
    /// Positive magnitude.
    pub amount: Money,
    /// Explicit kind tag.
    pub kind: TransactionKind,
    /// Set by the database on insert.
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            from_account_id: row.from_character_id,
            to_account_id: row.to_character_id,
            amount: row.amount,
            kind: row.kind,
            created_at: row.created_at,
        }
    }
}

/// Insert payload for the transactions table.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransactionRow {
    /// Sender.
    pub from_character_id: AccountId,
    /// Recipient.
    pub to_character_id: AccountId,
    /// Positive magnitude.
    pub amount: Money,
    /// Explicit kind tag.
    pub kind: TransactionKind,
}

impl From<&NewTransaction> for NewTransactionRow {
    fn from(row: &NewTransaction) -> Self {
        Self {
            from_character_id: row.from_account_id,
            to_character_id: row.to_account_id,
            amount: row.amount,
            kind: row.kind,
        }
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// `PostgreSQL` error code (`23505` for unique violations).
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Extra detail, e.g. the conflicting key.
    #[serde(default)]
    pub details: Option<String>,
    /// Suggested fix.
    #[serde(default)]
    pub hint: Option<String>,
}
