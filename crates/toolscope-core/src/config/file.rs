//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/toolscope/config.yaml) and workspace-level
//! (.config/toolscope/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ClientConfig, ConfigError, ConfigProvider, ConfigResult};

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/toolscope/config.yaml)
    User,
    /// Workspace-level config (.config/toolscope/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// # Example
///
/// ```no_run
/// use toolscope_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ClientConfig>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// User-level provider under the platform config directory
    pub fn user() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config")
        });
        Self::new(config_dir.join("toolscope").join("config.yaml"), ConfigLevel::User)
    }

    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".config").join("toolscope").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> ConfigResult<ClientConfig> {
        if !self.path.exists() {
            return Ok(ClientConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", self.path.display(), e)))
    }

    fn write(&self, config: &ClientConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(config)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize YAML: {}", e)))?;
        fs::write(&self.path, content)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Cached config, read from disk on first use
    pub fn get_config(&self) -> ConfigResult<ClientConfig> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        let config = self.read()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ClientConfig> {
        let config = self.read()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<ClientConfig> {
        self.get_config()
    }

    async fn save(&self, config: &ClientConfig) -> ConfigResult<()> {
        config.validate()?;
        self.write(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!provider.exists());
        assert_eq!(provider.load().await.unwrap(), ClientConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        let config = ClientConfig::default()
            .with_server_url("ws://127.0.0.1:9000/")
            .with_log_level("debug");
        provider.save(&config).await.unwrap();
        assert!(provider.exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("serverUrl:"));
        assert!(content.contains("127.0.0.1:9000"));
        assert!(content.contains("logLevel: debug"));

        assert_eq!(provider.reload().unwrap(), config);
    }

    #[tokio::test]
    async fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "logLevel: error\n").unwrap();

        let config = FileConfigProvider::new(&path, ConfigLevel::User).load().await.unwrap();
        assert_eq!(config.server_url, "ws://localhost:3000/");
        assert_eq!(config.log_level.as_deref(), Some("error"));
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "serverUrl: [unterminated\n").unwrap();

        let err = FileConfigProvider::new(&path, ConfigLevel::User).load().await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_is_not_saved() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        let config = ClientConfig::default().with_server_url("http://localhost/");
        assert!(matches!(provider.save(&config).await, Err(ConfigError::InvalidUrl(_))));
        assert!(!provider.exists());
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/work");
        assert_eq!(provider.level().as_str(), "workspace");
        assert!(provider.path().ends_with(".config/toolscope/config.yaml"));
    }
}
