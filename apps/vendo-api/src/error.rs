//! Error types for the HTTP layer.
//!
//! Every failure leaves the server in the same envelope:
//!
//! ```text
//! { "success": false, "error": "<message>", "code": "<CODE>", "retryable": false }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use vendo_core::ValidationError;
use vendo_db::DbError;
use vendo_ledger::LedgerError;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or expired bearer credential.
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Request body or query string could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(e) => match e {
                LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
                LedgerError::InsufficientStock { .. } | LedgerError::StockChanged { .. } => StatusCode::CONFLICT,
                LedgerError::ProductNotFound(_) | LedgerError::SaleNotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                LedgerError::Database(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
                LedgerError::ReversalFailed(_) | LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Database(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code. A missing credential is malformed input.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) | ApiError::InvalidRequest(_) | ApiError::Validation(_) => {
                "VALIDATION_ERROR"
            }
            ApiError::Ledger(e) => e.code(),
            ApiError::Database(DbError::NotFound { .. }) => "NOT_FOUND",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Ledger(e) => e.is_retryable(),
            ApiError::Database(e) => e.is_transient(),
            _ => false,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let message = if self.status().is_server_error() {
            // Storage details stay in the log.
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        ErrorEnvelope {
            success: false,
            error: message,
            code: self.code(),
            retryable: self.is_retryable(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
        }

        (status, Json(self.envelope())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
