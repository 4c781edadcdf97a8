//! Client configuration.
//!
//! Provides the API base URL, request timeout, read-retry budget and session
//! file location. Configuration is loaded from environment variables with
//! defaults suitable for a local development server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use dkn_auth::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::retry::RetryConfig;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings for [`KnowledgeClient`](crate::KnowledgeClient).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, including the `/api` prefix.
    pub base_url: String,

    /// Timeout applied to every request, in seconds.
    pub timeout_secs: u64,

    /// Attempts for idempotent reads. Mutations always get one.
    pub read_retries: u32,

    /// Whether to verify TLS certificates (disable only for testing).
    pub verify_tls: bool,

    /// Where the session is persisted; `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            read_retries: 3,
            verify_tls: true,
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, other values default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DKN_API_URL`: API base URL (default: http://localhost:8000/api)
    /// - `DKN_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    /// - `DKN_READ_RETRIES`: Attempts for read requests (default: 3)
    /// - `DKN_VERIFY_TLS`: Whether to verify TLS (default: true)
    /// - `DKN_SESSION_FILE`: JSON file the session is saved to (default: none)
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("DKN_API_URL").unwrap_or(default.base_url),
            timeout_secs: std::env::var("DKN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            read_retries: std::env::var("DKN_READ_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.read_retries),
            verify_tls: std::env::var("DKN_VERIFY_TLS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.verify_tls),
            session_file: std::env::var_os("DKN_SESSION_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy for reads.
    pub fn read_retry(&self) -> RetryConfig {
        RetryConfig::with_attempts(self.read_retries)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// The session store this configuration asks for.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        match &self.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path.clone())),
            None => Arc::new(MemorySessionStore::new()),
        }
    }

    /// Check the values before building a client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "DKN_API_URL".to_string(),
                message: format!("expected an http(s) URL, got {:?}", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DKN_TIMEOUT_SECS".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}
