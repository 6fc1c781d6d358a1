//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is reported to the client.

use crate::config::ConfigError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the portal core.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error running the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A malformed multipart upload.
    #[error("Upload Error: {0}")]
    Multipart(#[from] MultipartError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request clashes with what is already stored.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for form-level input errors.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Port(PortError::Validation(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Port(PortError::NotFound(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            ApiError::Port(PortError::AuthenticationFailure(msg)) => {
                (StatusCode::UNAUTHORIZED, msg.clone())
            }
            ApiError::Port(PortError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Port(PortError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Port(err @ PortError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Port(PortError::Unauthorized) => {
                (StatusCode::FORBIDDEN, "Unauthorized".to_string())
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Multipart(err) => (StatusCode::BAD_REQUEST, err.body_text()),
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "success": false, "reason": reason });
        (status, Json(body)).into_response()
    }
}
