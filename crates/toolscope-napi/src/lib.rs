//! Node.js bindings for Toolscope via napi-rs

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi::threadsafe_function::{ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;
use std::sync::{Arc, OnceLock};

use toolscope_core::config::{ClientConfig, FileConfigProvider};
use toolscope_core::logging::FileLogger;
use toolscope_core::rpc::{
    ConnectionObserver, RpcClient, RpcError, DEFAULT_SERVER_URL,
};
use toolscope_core::tools::{ToolDescriptor as CoreToolDescriptor, ToolDirectory};

fn to_napi_error(e: impl std::fmt::Display) -> Error {
    Error::from_reason(e.to_string())
}

// ============================================================================
// Tool Types
// ============================================================================

#[napi(object)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_keys: Vec<String>,
    /// Pretty `{"param": null}` skeleton for an arguments editor
    pub params_template: String,
    /// Raw input schema as JSON text
    pub input_schema: Option<String>,
}

impl From<CoreToolDescriptor> for ToolDescriptor {
    fn from(tool: CoreToolDescriptor) -> Self {
        let input_schema = if tool.input_schema().is_null() {
            None
        } else {
            Some(tool.input_schema().to_string())
        };
        Self {
            params_template: tool.params_template(),
            name: tool.name().to_string(),
            description: tool.description().map(str::to_string),
            input_keys: tool.input_keys().to_vec(),
            input_schema,
        }
    }
}

// ============================================================================
// Connection callbacks
// ============================================================================

/// Forwards connection events to JS; thread-safe functions queue the call
/// onto the JS thread.
struct JsObserver {
    on_connected: ThreadsafeFunction<()>,
    on_error: ThreadsafeFunction<String>,
    on_closed: Option<ThreadsafeFunction<String>>,
}

impl ConnectionObserver for JsObserver {
    fn on_connected(&self) {
        self.on_connected.call(Ok(()), ThreadsafeFunctionCallMode::NonBlocking);
    }

    fn on_error(&self, reason: &str) {
        self.on_error
            .call(Ok(reason.to_string()), ThreadsafeFunctionCallMode::NonBlocking);
    }

    fn on_closed(&self, reason: &str) {
        if let Some(on_closed) = &self.on_closed {
            on_closed.call(Ok(reason.to_string()), ThreadsafeFunctionCallMode::NonBlocking);
        }
    }
}

// ============================================================================
// ToolClient
// ============================================================================

/// One connection to a tool server
#[napi]
pub struct ToolClient {
    config: ClientConfig,
    directory: OnceLock<ToolDirectory>,
}

#[napi]
impl ToolClient {
    /// Explicit `url` wins; otherwise `TOOLSCOPE_SERVER_URL`, then the
    /// user config file, then the default.
    #[napi(constructor)]
    pub fn new(url: Option<String>) -> Result<Self> {
        let config = match url {
            Some(url) => {
                let config = ClientConfig::default().with_server_url(url);
                config.validate().map(|_| config)
            }
            None => {
                let provider = FileConfigProvider::user();
                let stored = provider.get_config().unwrap_or_else(|e| {
                    toolscope_core::logging::warn(
                        "napi",
                        &format!("Ignoring {}: {}", provider.path().display(), e),
                    );
                    ClientConfig::default()
                });
                stored.resolve()
            }
        }
        .map_err(to_napi_error)?;

        config.apply_logging();
        Ok(Self {
            config,
            directory: OnceLock::new(),
        })
    }

    #[napi(getter)]
    pub fn url(&self) -> String {
        self.config.server_url.clone()
    }

    /// idle, connecting, open, closed or failed
    #[napi(getter)]
    pub fn state(&self) -> String {
        self.directory
            .get()
            .map(|d| d.client().state().as_str())
            .unwrap_or("idle")
            .to_string()
    }

    /// Open the socket; outcome arrives through the callbacks
    #[napi]
    pub async fn connect(
        &self,
        #[napi(ts_arg_type = "(err: Error | null) => void")]
        on_connected: ThreadsafeFunction<()>,
        #[napi(ts_arg_type = "(err: Error | null, reason: string) => void")]
        on_error: ThreadsafeFunction<String>,
        #[napi(ts_arg_type = "(err: Error | null, reason: string) => void")]
        on_closed: Option<ThreadsafeFunction<String>>,
    ) -> Result<()> {
        let observer = Arc::new(JsObserver {
            on_connected,
            on_error,
            on_closed,
        });
        let client = RpcClient::builder(self.config.server_url.clone())
            .observer(observer)
            .logger(Arc::new(FileLogger::new("ToolClient")))
            .build();

        self.directory
            .set(ToolDirectory::new(client.clone()))
            .map_err(|_| to_napi_error(RpcError::AlreadyStarted))?;

        toolscope_core::logging::info(
            "napi",
            &format!("ToolClient.connect: {}", self.config.server_url),
        );
        client.connect().map_err(to_napi_error)
    }

    #[napi]
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let directory = self.directory()?;
        let tools = directory.list_tools().await.map_err(to_napi_error)?;
        Ok(tools.into_iter().map(Into::into).collect())
    }

    /// Call a tool with arguments as JSON object text; resolves to the
    /// result as JSON text
    #[napi]
    pub async fn call_tool(&self, name: String, arguments_json: Option<String>) -> Result<String> {
        let directory = self.directory()?;
        directory
            .call_tool_text(&name, arguments_json.as_deref().unwrap_or_default())
            .await
            .map_err(to_napi_error)
    }

    #[napi]
    pub fn close(&self) {
        if let Some(directory) = self.directory.get() {
            directory.client().close();
        }
    }

    fn directory(&self) -> Result<ToolDirectory> {
        self.directory
            .get()
            .cloned()
            .ok_or_else(|| to_napi_error(RpcError::NotConnected))
    }
}

/// Server URL used when nothing is configured
#[napi]
pub fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

// ============================================================================
// Debug Logging
// ============================================================================

/// Get the path to the debug log file
#[napi]
pub fn get_debug_log_path() -> String {
    toolscope_core::logging::log_file_path().to_string_lossy().to_string()
}

/// Clear the debug log file
#[napi]
pub fn clear_debug_log() {
    toolscope_core::logging::clear_log();
}

/// Write a message to the debug log
#[napi]
pub fn debug_log(module: String, message: String) {
    toolscope_core::logging::info(&module, &message);
}
