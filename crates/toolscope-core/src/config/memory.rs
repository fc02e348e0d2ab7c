//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ClientConfig, ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ClientConfig>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<ClientConfig> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: &ClientConfig) -> ConfigResult<()> {
        config.validate()?;
        *self.config.write() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[tokio::test]
    async fn test_memory_config_provider() {
        let provider = MemoryConfigProvider::new();
        assert_eq!(provider.load().await.unwrap(), ClientConfig::default());

        let config = ClientConfig::default().with_server_url("wss://tools.example.com/");
        provider.save(&config).await.unwrap();
        assert_eq!(provider.load().await.unwrap().server_url, "wss://tools.example.com/");

        let bad = ClientConfig::default().with_server_url("tcp://nope");
        assert!(matches!(provider.save(&bad).await, Err(ConfigError::InvalidUrl(_))));
        assert_eq!(provider.load().await.unwrap(), config);
    }
}
