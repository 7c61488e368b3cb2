//! Core types and utilities for tally.
//!
//! This crate provides the foundational types used throughout the tally ledger:
//!
//! - **Identifiers**: `AccountId`, `TransactionId`, `OwnerId`
//! - **Money**: `Money`, exact to the cent, and the `round2` helper
//! - **Accounts**: `Account`, `NewAccount`
//! - **Transactions**: `Transaction`, `NewTransaction`, `TransactionKind`
//! - **Fees**: `FeeSchedule`, `TransferQuote`, `DepositQuote`
//!
//! # Money
//!
//! Amounts are stored as `i64` cents to avoid floating point drift. Decimal
//! input is rounded to the nearest cent, midpoint away from zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod fees;
pub mod ids;
pub mod money;
pub mod transaction;

pub use account::{Account, NewAccount, DEFAULT_FEE_COLLECTOR_NAME};
pub use error::MoneyError;
pub use fees::{
    DepositQuote, FeeSchedule, TransferQuote, DEFAULT_DEPOSIT_FEE_RATE, DEFAULT_TRANSFER_FEE_RATE,
};
pub use ids::{AccountId, IdError, OwnerId, TransactionId, SENTINEL_OWNER_ID};
pub use money::{round2, Money, MONEY_SCALE};
pub use transaction::{NewTransaction, Transaction, TransactionKind};
