//! Storage layer for tally.
//!
//! Tally does not own its storage: accounts and the transaction log live in a
//! hosted relational store reached over a table API. This crate defines the
//! operations the ledger needs from that store and two implementations:
//!
//! - [`RestStore`]: a PostgREST-style HTTP table API (the hosted deployment)
//! - [`MemoryStore`]: in-process tables, used by tests and local runs
//!
//! Every call may fail; no call is retried here.
//!
//! # Example
//!
//! ```no_run
//! use tally_core::{Money, NewAccount};
//! use tally_store::{AccountStore, RestStore};
//!
//! # async fn example() -> Result<(), tally_store::StoreError> {
//! let store = RestStore::new("https://project.example.co", "anon-key")?;
//!
//! let account = store
//!     .insert_account(&NewAccount::new("alice", Money::from_cents(10_000)))
//!     .await?;
//! let accounts = store.list_accounts_ordered_by_name().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod rest;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreOp};
pub use rest::{RestStore, RestStoreOptions};

use async_trait::async_trait;
use tally_core::{Account, AccountId, Money, NewAccount, NewTransaction, Transaction};

/// Account table operations.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Get an account by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>>;

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>>;

    /// List all accounts, ordered by name ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn list_accounts_ordered_by_name(&self) -> Result<Vec<Account>>;

    /// Insert a new account; the store assigns its ID.
    ///
    /// # Errors
    ///
    /// - `StoreError::UniqueViolation` if the name is taken.
    /// - Any other error if the store call fails.
    async fn insert_account(&self, account: &NewAccount) -> Result<Account>;

    /// Insert or replace several accounts in one call, keyed by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn upsert_accounts(&self, accounts: &[Account]) -> Result<()>;

    /// Overwrite the balance of one account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    async fn update_account_balance(&self, id: &AccountId, balance: Money) -> Result<()>;

    /// Delete an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    async fn delete_account(&self, id: &AccountId) -> Result<()>;
}

/// Transaction-log operations.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Append rows to the log in a single call. Returns the stored rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<Transaction>>;

    /// Delete every row where the account is sender or recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn delete_transactions_by_account(&self, id: &AccountId) -> Result<()>;

    /// List all rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store call fails.
    async fn list_transactions_ordered_by_time_desc(&self) -> Result<Vec<Transaction>>;
}

/// A backend providing both the account table and the transaction log.
pub trait LedgerStore: AccountStore + TransactionLog {}

impl<T: AccountStore + TransactionLog + ?Sized> LedgerStore for T {}
