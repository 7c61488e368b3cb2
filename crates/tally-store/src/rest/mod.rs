//! PostgREST table API backend.
//!
//! The hosted store exposes each table under `/rest/v1/<table>` and accepts
//! filters as query parameters (`name=eq.alice`). This module maps the
//! [`AccountStore`](crate::AccountStore) and
//! [`TransactionLog`](crate::TransactionLog) operations onto those calls.

mod client;
mod types;

pub use client::{RestStore, RestStoreOptions};
pub use types::{AccountRow, ApiErrorBody, NewAccountRow, NewTransactionRow, TransactionRow};
