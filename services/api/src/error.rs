//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how port
//! errors become HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use brigo_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Maps a port error to the status/message pair the handlers return.
///
/// Unexpected errors are logged and their details kept out of the response.
pub fn port_error_response(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, what),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(details) => {
            error!("{}: {}", context, details);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}
