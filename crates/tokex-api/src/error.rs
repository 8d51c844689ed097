//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps exchange outcomes to HTTP status codes with a JSON error body.
//! Internal error details are logged, never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::exchange::ExchangeError;

/// Client-facing message for every credential failure.
pub const INVALID_CREDENTIAL_MESSAGE: &str = "invalid API key";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "UNAUTHORIZED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The presented credential was not accepted (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not available on this instance (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Known route, unsupported method (405).
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Exchange failures are logged once, with their reason, by the
        // orchestrator.
        if matches!(&self, Self::Internal(_)) {
            tracing::debug!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Map exchange failures to response classes. Unknown and invalid keys share
/// one message so responses never reveal whether a key exists.
impl From<ExchangeError> for AppError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::MalformedRequest(detail) => Self::BadRequest(detail),
            ExchangeError::InvalidCredential => {
                Self::Unauthorized(INVALID_CREDENTIAL_MESSAGE.to_string())
            }
            err @ (ExchangeError::StoreUnavailable(_) | ExchangeError::SigningFailure(_)) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
