//! Connection settings for the storefront admin backend, read from an
//! optional TOML file.
//!
//! A missing file yields `Config::default()`. Unknown keys are ignored by
//! serde, though we log a warning when the file contains potential typos.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Admin API connection configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. The admin token is masked in `Debug` output so it cannot
/// leak through logs or error messages.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the admin REST API.
    pub api_base_url: String,

    /// Base URL prefixed onto relative asset references for display.
    pub asset_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Bearer token for the admin API, if the deployment requires one.
    pub admin_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            asset_base_url: "http://127.0.0.1:8000/uploads".to_string(),
            request_timeout_secs: 30,
            admin_token: None,
        }
    }
}

/// Mask the admin token in Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("asset_base_url", &self.asset_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to flag likely typos
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "api_base_url",
                "asset_base_url",
                "request_timeout_secs",
                "admin_token",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), api = %config.api_base_url, "loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
