//! Client configuration management.
//!
//! Handles loading and accessing client configuration including the API
//! version, user agent, and timeouts. Configuration is persisted as TOML
//! on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{FgError, FgResult};

/// Which versioned API base URL relative endpoints are resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// v1 endpoints (feed, media actions).
    #[default]
    V1,
    /// v2 endpoints (upload, configure).
    V2,
}

impl ApiVersion {
    /// The base URL for this API version.
    pub fn base_url(&self) -> &'static str {
        match self {
            ApiVersion::V1 => constants::API_BASE_V1,
            ApiVersion::V2 => constants::API_BASE_V2,
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API version relative endpoints resolve against.
    #[serde(default)]
    pub api_version: ApiVersion,

    /// User agent string presented to the server.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Whether to accept invalid TLS certificates (debug proxies only).
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output for the file layer.
    #[serde(default)]
    pub json_output: bool,
}

fn default_user_agent() -> String {
    constants::DEFAULT_USER_AGENT.to_string()
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::V1,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout(),
            accept_invalid_certs: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> FgResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FgError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Serialize and write this configuration to a TOML file.
    pub fn save_toml_file(&self, path: &Path) -> FgResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| FgError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration file location (`<config dir>/fotogram/config.toml`).
    pub fn default_path() -> FgResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| FgError::Config("no config directory for this platform".into()))?;
        Ok(base.join(constants::CLIENT_NAME).join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_version, ApiVersion::V1);
        assert_eq!(config.timeout_ms, constants::DEFAULT_TIMEOUT_MS);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_base_url_by_version() {
        assert!(ApiVersion::V1.base_url().ends_with("/v1/"));
        assert!(ApiVersion::V2.base_url().ends_with("/v2/"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ClientConfig::default();
        config.api_version = ApiVersion::V2;
        config.timeout_ms = 5_000;
        config.save_toml_file(&path).unwrap();

        let loaded = ClientConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.api_version, ApiVersion::V2);
        assert_eq!(loaded.timeout_ms, 5_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: ClientConfig = toml::from_str(r#"api_version = "v2""#).unwrap();
        assert_eq!(parsed.api_version, ApiVersion::V2);
        assert_eq!(parsed.user_agent, constants::DEFAULT_USER_AGENT);
    }
}
