//! Connection lifecycle notifications

use std::fmt;

/// State of the single connection a client owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    /// Closed locally or by the server
    Closed,
    /// Handshake or transport failure
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Failed => "failed",
        }
    }

    /// Closed and Failed are final; a new client is needed to reconnect
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives connection events, delivered through the client's dispatcher
///
/// All methods default to doing nothing.
pub trait ConnectionObserver: Send + Sync {
    /// Handshake succeeded; requests may be sent from now on
    fn on_connected(&self) {}

    /// Handshake or transport failure
    fn on_error(&self, _reason: &str) {}

    /// Connection closed by either side
    fn on_closed(&self, _reason: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl ConnectionObserver for NoOpObserver {}
