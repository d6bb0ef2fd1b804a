//! Configuration management for the ChitChat client
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChitChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the ChitChat client
///
/// Holds everything needed to reach the ChitChat service: the API base URL
/// and the per-request timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server connection configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the ChitChat REST API, e.g. `http://localhost:8000/api/`
    ///
    /// A trailing slash is required so that relative endpoint paths join
    /// correctly.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, applying environment and CLI
    /// overrides.
    ///
    /// Precedence, lowest to highest: file, `CHITCHAT_BASE_URL` environment
    /// variable, `--server` CLI flag. A missing file yields the defaults so
    /// that the client works out of the box against a local server.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `server_override` - Optional base URL from the CLI
    ///
    /// # Errors
    ///
    /// Returns [`ChitChatError::Yaml`] if the file exists but cannot be
    /// parsed.
    pub fn load(path: impl AsRef<Path>, server_override: Option<&str>) -> Result<Self> {
        let path = path.as_ref();

        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents).map_err(ChitChatError::Yaml)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        if let Ok(base_url) = std::env::var("CHITCHAT_BASE_URL") {
            if !base_url.is_empty() {
                config.server.base_url = base_url;
            }
        }

        if let Some(base_url) = server_override {
            config.server.base_url = base_url.to_string();
        }

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChitChatError::Config`] if the base URL does not parse, is
    /// not http(s), or lacks the trailing slash needed for endpoint joins.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.server.base_url).map_err(|e| {
            ChitChatError::Config(format!(
                "invalid server base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ChitChatError::Config(format!(
                    "unsupported URL scheme '{}': expected http or https",
                    other
                ))
                .into());
            }
        }

        if !self.server.base_url.ends_with('/') {
            return Err(ChitChatError::Config(format!(
                "server base_url '{}' must end with a trailing slash",
                self.server.base_url
            ))
            .into());
        }

        if self.server.timeout_secs == 0 {
            return Err(ChitChatError::Config("timeout_secs must be non-zero".to_string()).into());
        }

        Ok(())
    }

    /// The parsed base URL. Call [`validate`](Self::validate) first.
    pub fn base_url(&self) -> Result<url::Url> {
        Ok(url::Url::parse(&self.server.base_url)
            .map_err(|e| ChitChatError::Config(e.to_string()))?)
    }
}
