//! crates/brigo_client/src/error.rs
//!
//! Errors surfaced by the app-side client.

use brigo_core::ports::PortError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("API error: {0}")]
    Api(String),

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error("Not signed in")]
    NotSignedIn,
}

pub type ClientResult<T> = Result<T, ClientError>;
