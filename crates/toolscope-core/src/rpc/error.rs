//! RPC error types

use thiserror::Error;

/// Errors delivered to RPC callers
///
/// `Remote`, `Transport` and `Closed` display as the bare message so the
/// panel can show exactly what the server or socket said.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    /// WebSocket handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Socket-level failure after the connection opened
    #[error("{0}")]
    Transport(String),

    /// The server answered with an `error` member
    #[error("{0}")]
    Remote(String),

    /// Connection closed locally or by the server
    #[error("{0}")]
    Closed(String),

    #[error("Not connected")]
    NotConnected,

    /// `connect` was already called on this client
    #[error("Connection already started")]
    AlreadyStarted,

    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller-supplied arguments could not be parsed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Json(e.to_string())
    }
}

pub type RpcResult<T> = Result<T, RpcError>;
