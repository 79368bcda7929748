// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// API error types
///
/// Every domain error is mapped to a transport status exactly once, in
/// `IntoResponse` below. Handlers never pick status codes themselves.
#[derive(Debug)]
pub enum ApiError {
    /// Bad input shape or format (400)
    Validation(String),
    /// Bad, expired or missing credentials (401)
    Unauthorized(String),
    /// Too many login attempts from one client IP (429)
    RateLimited { retry_after: u64 },
    /// Requested resource does not exist for this caller (404)
    NotFound(String),
    /// A required third-party credential is absent from the deployment (501)
    NotConfigured(String),
    /// Third-party API failure, surfaced with the status we map it to
    Upstream { status: StatusCode, message: String },
    /// Store-level failure; detail is logged, never surfaced (500)
    Database(sqlx::Error),
    /// Anything unexpected (500)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::RateLimited { retry_after } => {
                write!(f, "Rate Limited: retry in {} seconds", retry_after)
            }
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::NotConfigured(msg) => write!(f, "Not Configured: {}", msg),
            ApiError::Upstream { status, message } => {
                write!(f, "Upstream Error ({}): {}", status, message)
            }
            ApiError::Database(e) => write!(f, "Database Error: {}", e),
            ApiError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut retry_after = None;
        let (status, error_message, code) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::RateLimited { retry_after: secs } => {
                retry_after = Some(secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    format!("Too many login attempts. Please try again in {} seconds", secs),
                    "RATE_LIMITED",
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::NotConfigured(msg) => {
                (StatusCode::NOT_IMPLEMENTED, msg, "NOT_CONFIGURED")
            }
            ApiError::Upstream { status, message } => (status, message, "UPSTREAM_ERROR"),
            ApiError::Database(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
            retry_after,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}
