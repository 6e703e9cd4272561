//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default Assessment API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// File name of the durable identity record inside the state directory.
pub const IDENTITY_FILE: &str = "identity.json";

/// Client configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Assessment API base URL, without a trailing slash.
    pub api_url: String,
    /// Directory for the identity file and logs.
    pub state_dir: PathBuf,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: default_state_dir(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let api_url = std::env::var("BURNOUT_API_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let state_dir = std::env::var("BURNOUT_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());

        let timeout_secs: u64 = std::env::var("BURNOUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(30);

        Self {
            api_url,
            state_dir,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Path of the durable identity file.
    pub fn identity_path(&self) -> PathBuf {
        self.state_dir.join(IDENTITY_FILE)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "BURNOUT_API_URL".to_string(),
                message: format!("expected an http(s) URL, got '{}'", self.api_url),
            });
        }
        Ok(())
    }

    /// Create the state and log directories if missing.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

fn default_state_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".burnout-tracker")
}
