//! Client configuration
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)
//!
//! `TOOLSCOPE_SERVER_URL` overrides whatever URL the source holds; see
//! [`ClientConfig::resolve`].

mod file;
mod memory;
mod traits;

pub use file::{ConfigLevel, FileConfigProvider};
pub use memory::MemoryConfigProvider;
pub use traits::{
    validate_server_url, ClientConfig, ConfigError, ConfigProvider, ConfigResult, SERVER_URL_ENV,
};
