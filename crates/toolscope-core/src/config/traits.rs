//! Configuration types and the provider trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::logging::{file_logger, LogLevel};
use crate::rpc::DEFAULT_SERVER_URL;

/// Environment variable that overrides the configured server URL
pub const SERVER_URL_ENV: &str = "TOOLSCOPE_SERVER_URL";

/// Settings for a tool client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// WebSocket endpoint of the tool server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Minimum level for the debug log file (trace, debug, info, warn, error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            log_level: None,
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Apply `TOOLSCOPE_SERVER_URL` and validate the result
    pub fn resolve(self) -> ConfigResult<Self> {
        self.resolve_with(std::env::var(SERVER_URL_ENV).ok())
    }

    /// Apply an explicit URL override (blank means none) and validate
    pub fn resolve_with(mut self, url_override: Option<String>) -> ConfigResult<Self> {
        if let Some(url) = url_override.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.server_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the URL is ws/wss with a host, and the log level is known
    pub fn validate(&self) -> ConfigResult<()> {
        validate_server_url(&self.server_url)?;
        if let Some(level) = &self.log_level {
            if LogLevel::parse(level).is_none() {
                return Err(ConfigError::Other(format!("Unknown log level: {}", level)));
            }
        }
        Ok(())
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Push the configured level into the file logger
    pub fn apply_logging(&self) {
        if let Some(level) = self.level() {
            file_logger::set_min_level(level);
        }
    }
}

/// Reject anything that is not `ws://host...` or `wss://host...`
pub fn validate_server_url(url: &str) -> ConfigResult<()> {
    let rest = url
        .strip_prefix("ws://")
        .or_else(|| url.strip_prefix("wss://"))
        .ok_or_else(|| ConfigError::InvalidUrl(url.to_string()))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.starts_with(':') {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }
    Ok(())
}

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (~/.config/toolscope/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Current configuration; a missing source yields defaults
    async fn load(&self) -> ConfigResult<ClientConfig>;

    /// Replace the stored configuration
    async fn save(&self, config: &ClientConfig) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid server URL (expected ws:// or wss://): {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "ws://localhost:3000/");
        assert!(config.level().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url_override() {
        let config = ClientConfig::default()
            .resolve_with(Some("wss://tools.example.com/rpc".to_string()))
            .unwrap();
        assert_eq!(config.server_url, "wss://tools.example.com/rpc");

        let config = ClientConfig::default().resolve_with(Some("   ".to_string())).unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_invalid_urls_rejected() {
        for url in ["http://localhost:3000/", "ws://", "ws://:3000/", "localhost:3000", ""] {
            assert!(
                matches!(validate_server_url(url), Err(ConfigError::InvalidUrl(_))),
                "{} should be rejected",
                url
            );
        }
        assert!(validate_server_url("ws://127.0.0.1:9000").is_ok());
        assert!(validate_server_url("wss://host?token=1").is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let config = ClientConfig::default().with_log_level("warn");
        assert_eq!(config.level(), Some(LogLevel::Warn));
        assert!(config.validate().is_ok());

        let config = ClientConfig::default().with_log_level("loud");
        assert!(matches!(config.validate(), Err(ConfigError::Other(_))));
    }
}
