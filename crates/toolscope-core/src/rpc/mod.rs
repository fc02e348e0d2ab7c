//! JSON-RPC over WebSocket
//!
//! [`RpcClient`] owns one connection to a tool server and correlates
//! responses to requests by numeric id. Completions come back either as
//! callbacks, run through the injected [`Dispatcher`](crate::dispatch::Dispatcher),
//! or as [`PendingCall`] futures.
//!
//! ```rust,ignore
//! let client = RpcClient::builder("ws://localhost:3000/")
//!     .observer(observer)
//!     .dispatcher(Arc::new(queue.dispatcher()))
//!     .build();
//! client.connect()?;
//! client.connected().await?;
//!
//! let result = client.call("tools/list", json!({})).await?;
//! ```

mod client;
mod envelope;
mod error;
mod observer;
mod pending;
mod transport;

pub use client::{PendingCall, RpcClient, RpcClientBuilder, DEFAULT_SERVER_URL};
pub use envelope::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use error::{RpcError, RpcResult};
pub use observer::{ConnectionObserver, ConnectionState, NoOpObserver};
pub use pending::Callback;

#[cfg(test)]
pub(crate) use client::Outbound;
