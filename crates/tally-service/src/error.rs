//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use tally_ledger::LedgerError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Ledger(err) => ledger_parts(err),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

fn ledger_parts(
    err: &LedgerError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    let code = err.code();
    match err {
        LedgerError::InvalidAmount { .. }
        | LedgerError::EmptyName
        | LedgerError::NegativeBalance { .. }
        | LedgerError::Arithmetic(_) => (StatusCode::BAD_REQUEST, code, err.to_string(), None),
        LedgerError::InsufficientFunds {
            available,
            required,
        } => (
            StatusCode::PAYMENT_REQUIRED,
            code,
            err.to_string(),
            Some(json!({ "balance": available, "required": required })),
        ),
        LedgerError::InsufficientBalance {
            available,
            requested,
        } => (
            StatusCode::PAYMENT_REQUIRED,
            code,
            err.to_string(),
            Some(json!({ "balance": available, "requested": requested })),
        ),
        LedgerError::DuplicateAccount { .. } => (StatusCode::CONFLICT, code, err.to_string(), None),
        LedgerError::UnknownAccount { .. } => (StatusCode::NOT_FOUND, code, err.to_string(), None),
        LedgerError::ProtectedAccount { .. } => {
            (StatusCode::FORBIDDEN, code, err.to_string(), None)
        }
        LedgerError::FeeCollectorUnavailable { .. } => {
            tracing::error!(error = %err, "Fee collector unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                code,
                "The fee collector account is unavailable".to_string(),
                None,
            )
        }
        LedgerError::Persistence(source) => {
            tracing::error!(error = %source, "Store request failed");
            (
                StatusCode::BAD_GATEWAY,
                code,
                "The store request failed; nothing was written".to_string(),
                None,
            )
        }
        LedgerError::PartialFailure { stage, source }
        | LedgerError::DeletionFailed { stage, source } => {
            tracing::error!(error = %source, %stage, "Operation only partially applied");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                format!("The operation failed at {stage} after earlier writes succeeded"),
                Some(json!({ "stage": stage })),
            )
        }
    }
}
