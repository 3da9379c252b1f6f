//! Error types for microsetta-admin
//!
//! Recoverable pulldown problems never appear here; they are collected in the
//! pulldown's `ErrorReport`. `PulldownError` covers the conditions that abort
//! a pulldown, `ApiError` the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Hard pulldown failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PulldownError {
    /// Sanitizing a multiselect option would drop characters, so two distinct
    /// options could land in one column
    #[error("Unsafe column name for {base}: option '{option}' contains characters outside [0-9a-zA-Z_ ]")]
    UnsafeColumnName { base: String, option: String },

    /// Two options of one question produce the same column
    #[error("Options '{first}' and '{second}' of {base} both map to column {column}")]
    ColumnCollision {
        base: String,
        first: String,
        second: String,
        column: String,
    },
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Pulldown aborted
    #[error("Pulldown failed: {0}")]
    Pulldown(#[from] PulldownError),

    /// microsetta-common error
    #[error("Common error: {0}")]
    Common(#[from] microsetta_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Pulldown(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PULLDOWN_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
