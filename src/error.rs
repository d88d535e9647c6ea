//! Error taxonomy for the gateway API
//!
//! Every fallible operation in the core returns `ApiError`. The enum maps
//! one-to-one onto HTTP responses, so handlers stay thin: business code
//! returns `Err(...)` and axum renders the JSON body via `IntoResponse`.
//!
//! Payer-facing failures (`Closed`, `NoActiveRule`) are not faults; they are
//! scheduled states the caller retries later. Storage and serialization
//! failures are logged with full detail but surfaced as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input: bad URL syntax, inverted validity window,
    /// inverted working hours, bad time format
    #[error("{0}")]
    Validation(String),

    /// Referenced rule or session id does not exist
    #[error("{0}")]
    NotFound(String),

    /// Attempted to activate a rule outside its validity window
    #[error("{0}")]
    RuleExpired(String),

    /// Working hours gate denied issuance; carries the closure message
    /// shown to the payer
    #[error("{0}")]
    Closed(String),

    /// No rule is both active and inside its validity window
    #[error("no active payment link is configured")]
    NoActiveRule,

    /// The session's TTL has passed; the payer must request a fresh one
    #[error("payment session has expired")]
    SessionExpired,

    /// Persistence failure, treated as transient infrastructure trouble
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Stored record could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// redb surfaces each transaction phase as its own error type; fold them all
// into the generic storage variant so store code can use `?` throughout.
impl From<redb::TransactionError> for ApiError {
    fn from(e: redb::TransactionError) -> Self {
        ApiError::Storage(e.into())
    }
}

impl From<redb::TableError> for ApiError {
    fn from(e: redb::TableError) -> Self {
        ApiError::Storage(e.into())
    }
}

impl From<redb::StorageError> for ApiError {
    fn from(e: redb::StorageError) -> Self {
        ApiError::Storage(e.into())
    }
}

impl From<redb::CommitError> for ApiError {
    fn from(e: redb::CommitError) -> Self {
        ApiError::Storage(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::RuleExpired(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "rule_expired", msg.clone())
            }
            ApiError::SessionExpired => (
                StatusCode::GONE,
                "session_expired",
                "Payment session has expired, request a new one".to_string(),
            ),
            // Scheduled closure: safe to retry later, message is payer-facing
            ApiError::Closed(msg) => (StatusCode::SERVICE_UNAVAILABLE, "closed", msg.clone()),
            ApiError::NoActiveRule => (
                StatusCode::SERVICE_UNAVAILABLE,
                "maintenance",
                "Payment is temporarily unavailable".to_string(),
            ),
            ApiError::Storage(e) => {
                error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Serialization(e) => {
                error!(error = %e, "record serialization failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": code,
                "message": message,
            })),
        )
            .into_response()
    }
}
