//! Health check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tally_core::AccountId;

use crate::config::StoreBackend;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the process answers.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Configured store backend.
    pub store: StoreBackend,
    /// Fee collector ID, once resolved. The store is not queried here.
    pub fee_collector_id: Option<AccountId>,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "tally",
        version: env!("CARGO_PKG_VERSION"),
        store: state.config.store_backend,
        fee_collector_id: state.ledger.cached_fee_collector_id(),
    })
}
