//! Account handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::{Account, AccountId, Money};

use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Unique name.
    pub name: String,
    /// Current balance.
    pub balance: Money,
    /// Whether this account collects fees. Such accounts cannot be deleted.
    pub is_fee_collector: bool,
}

impl AccountResponse {
    fn new(account: Account, fee_collector_name: &str) -> Self {
        Self {
            is_fee_collector: account.name == fee_collector_name,
            id: account.id,
            name: account.name,
            balance: account.balance,
        }
    }
}

/// Create account request.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Unique, non-empty name.
    pub name: String,
    /// Starting balance (default: 0.00).
    #[serde(default)]
    pub initial_balance: Money,
}

/// List all accounts, ordered by name.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let collector_name = &state.config.fee_collector_name;
    let accounts = state
        .ledger
        .accounts()
        .await?
        .into_iter()
        .map(|account| AccountResponse::new(account, collector_name))
        .collect();

    Ok(Json(accounts))
}

/// Create a new account.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state
        .ledger
        .create_account(&body.name, body.initial_balance)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::new(
            account,
            &state.config.fee_collector_name,
        )),
    ))
}

/// Delete an account.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id: AccountId = account_id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid account id: {e}")))?;

    state.ledger.delete_account(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the fee collector account, creating it if needed.
pub async fn get_fee_collector(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.ledger.fee_collector().await?;
    Ok(Json(AccountResponse::new(
        account,
        &state.config.fee_collector_name,
    )))
}
