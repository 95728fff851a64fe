//! Client configuration
//!
//! Defaults match the production API. Environment variables override the
//! defaults, CLI flags override the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Production API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.filety.ru";

/// Per-request timeout in seconds, for calls outside the transcription workflow
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Delay between two status polls, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_500;

/// Overall deadline for submit + polling, in seconds
pub const DEFAULT_DEADLINE_SECS: u64 = 180;

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "FILETY_API_URL";

/// Environment variable overriding the per-request timeout
pub const ENV_REQUEST_TIMEOUT: &str = "FILETY_REQUEST_TIMEOUT_SECS";

/// Environment variable overriding the state directory
pub const ENV_STATE_DIR: &str = "FILETY_STATE_DIR";

// ============================================================================
// Configuration
// ============================================================================

/// Configuration shared by the request client and the transcription workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// Timeout of a single account, identity, history or health request
    ///
    /// The upload and the status polls are bounded by `deadline` only.
    pub request_timeout: Duration,
    /// Delay before each status poll
    pub poll_interval: Duration,
    /// Deadline covering the submit call and the whole poll loop
    pub deadline: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at a specific base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load the configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }

        if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::config(format!("{} must be a number of seconds, got '{}'", ENV_REQUEST_TIMEOUT, raw))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()
    }

    /// Validate and normalize the configuration
    pub fn validate(self) -> Result<Self> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();

        if base_url.is_empty() {
            return Err(Error::config("API base URL is empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be greater than zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("Poll interval must be greater than zero"));
        }
        if self.deadline.is_zero() {
            return Err(Error::config("Deadline must be greater than zero"));
        }

        Ok(Self { base_url, ..self })
    }

    /// Build an absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Directory holding client state (the anonymous identifier)
///
/// `FILETY_STATE_DIR` takes precedence over the platform data directory.
pub fn default_state_dir() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_STATE_DIR) {
        return Ok(PathBuf::from(path));
    }

    let dirs = directories::ProjectDirs::from("ru", "filety", "Filety")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().to_path_buf())
}
