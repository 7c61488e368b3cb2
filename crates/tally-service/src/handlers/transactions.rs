//! Transaction log handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use tally_core::Transaction;

use crate::error::ApiError;
use crate::state::AppState;

/// List the transaction log, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.ledger.transactions().await?))
}
