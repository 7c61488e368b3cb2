//! Ledger transaction engine for tally.
//!
//! The engine validates operations against a [`Snapshot`] of the account
//! table, computes fees, and writes log rows and balances to a
//! [`LedgerStore`](tally_store::LedgerStore).
//!
//! # Fees
//!
//! | Operation  | Fee                         | Who pays            |
//! |------------|-----------------------------|---------------------|
//! | Transfer   | 8% of amount, on top        | sender              |
//! | Deposit    | 5% of amount, deducted      | depositor           |
//! | Withdrawal | none                        |                     |
//!
//! Fees go to the fee collector account (see [`FeeCollector`]).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tally_core::Money;
//! use tally_ledger::{Ledger, LedgerConfig};
//! use tally_store::MemoryStore;
//!
//! # async fn example() -> tally_ledger::Result<()> {
//! let ledger = Ledger::new(Arc::new(MemoryStore::new()), LedgerConfig::default());
//!
//! let alice = ledger.create_account("alice", Money::from_cents(10_000)).await?;
//! let bob = ledger.create_account("bob", Money::ZERO).await?;
//!
//! let snapshot = ledger.snapshot().await?;
//! let receipt = ledger
//!     .transfer(&snapshot, alice.id, bob.id, Money::from_cents(5_000))
//!     .await?;
//! assert_eq!(receipt.balance_after(&alice.id), Some(Money::from_cents(4_600)));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod error;
pub mod ledger;
mod plan;
pub mod receipt;
pub mod snapshot;

pub use collector::FeeCollector;
pub use config::{DeletionPolicy, LedgerConfig};
pub use error::{LedgerError, Result, WriteStage};
pub use ledger::Ledger;
pub use receipt::{BalanceChange, Operation, Receipt};
pub use snapshot::Snapshot;
