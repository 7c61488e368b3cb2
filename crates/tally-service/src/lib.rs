//! Tally HTTP API service.
//!
//! Exposes the ledger operations over HTTP:
//!
//! - Account listing, creation and deletion
//! - Transfers, deposits and withdrawals, each answered with a receipt
//! - The transaction log and the fee collector account
//!
//! There is no authentication; the service is meant to sit behind whatever
//! fronts the hosted store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, StartupError};
