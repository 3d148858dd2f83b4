//! crates/brigo_client/src/config.rs
//!
//! Client configuration, loaded from environment variables (and `.env` in development).

use brigo_core::retry::RetryPolicy;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the Brigo API, without a trailing slash.
    pub api_url: String,
    /// Retry policy for notebook loads.
    pub load_retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// A config pointing at `api_url` with default retry and timeout settings.
    pub fn new(api_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url("BRIGO_API_URL", api_url.into())?,
            load_retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(15),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("BRIGO_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("BRIGO_API_URL".to_string()))?;
        let mut config = Self::new(api_url)?;

        if let Some(attempts) = parse_var::<u32>(&lookup, "BRIGO_LOAD_MAX_ATTEMPTS")? {
            if attempts == 0 {
                return Err(ConfigError::InvalidValue(
                    "BRIGO_LOAD_MAX_ATTEMPTS".to_string(),
                    "must be at least 1".to_string(),
                ));
            }
            config.load_retry.max_attempts = attempts;
        }
        if let Some(delay_ms) = parse_var::<u64>(&lookup, "BRIGO_LOAD_RETRY_DELAY_MS")? {
            config.load_retry.base_delay = Duration::from_millis(delay_ms);
            config.load_retry.max_delay = Duration::from_millis(delay_ms.saturating_mul(4));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BRIGO_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), format!("'{}' is not a number", raw))
            })
        })
        .transpose()
}

fn normalize_api_url(key: &str, raw: String) -> Result<String, ConfigError> {
    let url = raw.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidValue(
            key.to_string(),
            "must include http:// or https://".to_string(),
        ))
    }
}
