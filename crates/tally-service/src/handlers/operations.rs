//! Transfer, deposit and withdrawal handlers.
//!
//! Each handler reads a fresh snapshot of the accounts, runs the operation
//! against it and returns the ledger's receipt. The operation runs on its own
//! task, detached from the request.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tokio::task::JoinHandle;

use tally_core::{AccountId, Money};
use tally_ledger::Receipt;

use crate::error::ApiError;
use crate::state::AppState;

/// Transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Sender.
    pub from_account_id: AccountId,
    /// Recipient.
    pub to_account_id: AccountId,
    /// Amount received by the recipient; the sender also pays the fee.
    pub amount: Money,
}

/// Deposit or withdrawal request.
#[derive(Debug, Deserialize)]
pub struct AccountAmountRequest {
    /// Target account.
    pub account_id: AccountId,
    /// Amount.
    pub amount: Money,
}

/// Transfer funds between accounts.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<Receipt>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let task = tokio::spawn(async move {
        let snapshot = ledger.snapshot().await?;
        ledger
            .transfer(&snapshot, body.from_account_id, body.to_account_id, body.amount)
            .await
    });

    finish(task).await
}

/// Add funds to an account.
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AccountAmountRequest>,
) -> Result<Json<Receipt>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let task = tokio::spawn(async move {
        let snapshot = ledger.snapshot().await?;
        ledger.deposit(&snapshot, body.account_id, body.amount).await
    });

    finish(task).await
}

/// Withdraw funds from an account.
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AccountAmountRequest>,
) -> Result<Json<Receipt>, ApiError> {
    let ledger = Arc::clone(&state.ledger);
    let task = tokio::spawn(async move {
        let snapshot = ledger.snapshot().await?;
        ledger.withdraw(&snapshot, body.account_id, body.amount).await
    });

    finish(task).await
}

/// Await an operation task.
///
/// If the request is dropped (client gone, request timeout) the task keeps
/// running, so the log and balance writes are never cut apart by the HTTP layer.
async fn finish(task: JoinHandle<tally_ledger::Result<Receipt>>) -> Result<Json<Receipt>, ApiError> {
    match task.await {
        Ok(result) => Ok(Json(result?)),
        Err(e) => Err(ApiError::Internal(format!("operation task failed: {e}"))),
    }
}
