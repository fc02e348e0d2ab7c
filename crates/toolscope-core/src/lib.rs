//! Toolscope Core
//!
//! Runtime-agnostic client for tool servers speaking JSON-RPC 2.0 over a
//! WebSocket. This crate provides the core functionality that can be used
//! from any environment (Node.js via napi-rs, native CLI, etc.)
//!
//! ## Tool Discovery
//!
//! The `tools` module lists what a server offers and invokes it:
//! - `tools/list` results become [`ToolDescriptor`]s with their parameter names
//! - `tools/call` takes native arguments and returns the result as JSON text
//!
//! ```rust,ignore
//! use toolscope_core::{RpcClient, ToolDirectory};
//!
//! let client = RpcClient::new("ws://localhost:3000/");
//! client.connect()?;
//! client.connected().await?;
//!
//! let directory = ToolDirectory::new(client);
//! let tools = directory.list_tools().await?;
//! let output = directory.call_tool_text(tools[0].name(), "{}").await?;
//! ```

pub mod logging;
pub mod config;
pub mod codec;
pub mod dispatch;
pub mod rpc;
pub mod tools;

// Re-export commonly used types
pub use codec::{CodecError, CodecResult, NativeMap, NativeValue};

pub use config::{
    ClientConfig, ConfigError, ConfigProvider, ConfigResult,
    FileConfigProvider, MemoryConfigProvider,
};

pub use dispatch::{
    DispatchQueue, Dispatcher, InlineDispatcher, QueueDispatcher, SharedDispatcher,
};

pub use rpc::{
    ConnectionObserver, ConnectionState, PendingCall, RpcClient, RpcClientBuilder,
    RpcError, RpcResult, DEFAULT_SERVER_URL,
};

pub use tools::{ToolDescriptor, ToolDirectory};

pub use logging::{ConsoleLogger, Logger, MemoryLogger, NoOpLogger, SharedLogger};
