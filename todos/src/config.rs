//! Configuration management for the task list.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Only the user id is required.

use crate::types::UserId;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default remote API base URL
pub const DEFAULT_API_URL: &str = "https://mate.academy/students-api";

/// Default time an error notification stays visible
pub const DEFAULT_ERROR_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("Invalid value for {name}: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Remote API base URL, without trailing slash
    pub api_base_url: String,
    /// User whose todos are managed
    pub user_id: UserId,
    /// How long an error notification stays visible
    pub error_timeout: Duration,
    /// Per-request timeout of the HTTP client
    pub request_timeout: Duration,
}

impl Config {
    /// Create a configuration for `user_id` with default settings
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_id,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `TASKLIST_USER_ID` (required, non-zero)
    /// - `TASKLIST_API_URL` (default: `https://mate.academy/students-api`)
    /// - `TASKLIST_ERROR_TIMEOUT_MS` (default: 3000)
    /// - `TASKLIST_REQUEST_TIMEOUT_MS` (default: 10000)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the user id is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the user id is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_user = lookup("TASKLIST_USER_ID").ok_or(ConfigError::Missing("TASKLIST_USER_ID"))?;
        let user_id = raw_user
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new)
            .ok_or_else(|| ConfigError::Invalid {
                name: "TASKLIST_USER_ID",
                value: raw_user.clone(),
            })?;

        let millis = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map_or(default, Duration::from_millis)
        };

        Ok(Self {
            api_base_url: lookup("TASKLIST_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            user_id,
            error_timeout: millis("TASKLIST_ERROR_TIMEOUT_MS", DEFAULT_ERROR_TIMEOUT),
            request_timeout: millis("TASKLIST_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT),
        })
    }
}
