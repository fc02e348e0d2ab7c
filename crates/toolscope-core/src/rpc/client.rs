//! WebSocket JSON-RPC client
//!
//! One client owns one connection and one table of outstanding requests.
//! Requests are written as text frames; responses are matched back by `id`
//! on the socket task and completed through the injected dispatcher.
//!
//! There are no timeouts and no retries: a request that never gets an answer
//! stays pending until the connection fails or is closed.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

use super::envelope::{JsonRpcRequest, JsonRpcResponse};
use super::error::{RpcError, RpcResult};
use super::observer::{ConnectionObserver, ConnectionState, NoOpObserver};
use super::pending::{Completion, PendingTable};
use super::transport;
use crate::dispatch::{InlineDispatcher, SharedDispatcher};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::{log_debug, log_info};

/// Server the inspector panel points at out of the box
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:3000/";

/// Frames queued for the socket writer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outbound {
    Text(String),
    Close,
}

/// Builder for [`RpcClient`]
pub struct RpcClientBuilder {
    url: String,
    observer: Arc<dyn ConnectionObserver>,
    dispatcher: SharedDispatcher,
    logger: SharedLogger,
}

impl RpcClientBuilder {
    pub fn observer(mut self, observer: Arc<dyn ConnectionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Where callbacks and connection events run (inline by default)
    pub fn dispatcher(mut self, dispatcher: SharedDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> RpcClient {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        RpcClient {
            inner: Arc::new(Inner {
                url: self.url,
                state: Mutex::new(ConnectionState::Idle),
                state_tx,
                last_error: Mutex::new(None),
                next_id: AtomicU64::new(1),
                pending: PendingTable::new(),
                outbound: Mutex::new(None),
                observer: self.observer,
                dispatcher: self.dispatcher,
                logger: self.logger,
            }),
        }
    }
}

/// JSON-RPC 2.0 client over a single WebSocket connection
///
/// Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    // Lock order: state, then outbound, then pending
    state: Mutex<ConnectionState>,
    state_tx: watch::Sender<ConnectionState>,
    last_error: Mutex<Option<String>>,
    next_id: AtomicU64,
    pending: PendingTable,
    outbound: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
    observer: Arc<dyn ConnectionObserver>,
    dispatcher: SharedDispatcher,
    logger: SharedLogger,
}

impl RpcClient {
    /// Client with no observer, inline dispatch and no logging
    pub fn new(url: impl Into<String>) -> Self {
        Self::builder(url).build()
    }

    pub fn builder(url: impl Into<String>) -> RpcClientBuilder {
        RpcClientBuilder {
            url: url.into(),
            observer: Arc::new(NoOpObserver),
            dispatcher: Arc::new(InlineDispatcher),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Reason of the last handshake or transport failure
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn is_pending(&self, id: u64) -> bool {
        self.inner.pending.contains(id)
    }

    /// The id the next request will get
    pub fn next_request_id(&self) -> u64 {
        self.inner.next_id.load(Ordering::SeqCst)
    }

    pub(crate) fn logger(&self) -> &SharedLogger {
        &self.inner.logger
    }

    /// Start the WebSocket handshake on the current tokio runtime
    ///
    /// Returns immediately; the observer hears `on_connected` or `on_error`.
    /// A client connects at most once.
    pub fn connect(&self) -> RpcResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| RpcError::NoRuntime(e.to_string()))?;
        {
            let mut state = self.inner.state.lock();
            if *state != ConnectionState::Idle {
                return Err(RpcError::AlreadyStarted);
            }
            self.transition(&mut state, ConnectionState::Connecting);
        }
        log_info!(self.inner.logger, "[RpcClient] Connecting to {}", self.inner.url);
        runtime.spawn(transport::run(self.clone()));
        Ok(())
    }

    /// Wait until the handshake settles
    pub async fn connected(&self) -> RpcResult<()> {
        let mut rx = self.inner.state_tx.subscribe();
        let settled = match rx.wait_for(|s| *s != ConnectionState::Connecting).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        match settled {
            ConnectionState::Open => Ok(()),
            ConnectionState::Idle | ConnectionState::Connecting => Err(RpcError::NotConnected),
            ConnectionState::Closed => Err(RpcError::Closed("connection closed".to_string())),
            ConnectionState::Failed => Err(RpcError::ConnectionFailed(
                self.last_error().unwrap_or_else(|| "connection failure".to_string()),
            )),
        }
    }

    /// Send a request; `callback` runs on the dispatcher with the outcome
    ///
    /// Returns the request id. When the connection is not open the id is
    /// still consumed and the callback gets [`RpcError::NotConnected`].
    pub fn call_with<F>(&self, method: &str, params: Value, callback: F) -> u64
    where
        F: FnOnce(RpcResult<Value>) + Send + 'static,
    {
        self.send_request(method, params, Completion::Callback(Box::new(callback)))
    }

    /// Send a request and get a future for its outcome
    ///
    /// The future is completed directly from the socket task, bypassing the
    /// dispatcher.
    pub fn call(&self, method: &str, params: Value) -> PendingCall {
        let (tx, rx) = oneshot::channel();
        let id = self.send_request(method, params, Completion::Channel(tx));
        PendingCall { id, rx }
    }

    /// Close the connection; outstanding requests fail with [`RpcError::Closed`]
    pub fn close(&self) {
        self.shut_down(ConnectionState::Closed, "connection closed", true);
    }

    fn send_request(&self, method: &str, params: Value, completion: Completion) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let text = match JsonRpcRequest::new(id, method, params).to_text() {
            Ok(text) => text,
            Err(e) => {
                self.complete(completion, Err(e));
                return id;
            }
        };

        // Insert under the state lock so a concurrent failure either sees
        // this entry in its drain or we see the failed state
        let state = self.inner.state.lock();
        let tx = match *state {
            ConnectionState::Open => self.inner.outbound.lock().clone(),
            _ => None,
        };
        let Some(tx) = tx else {
            let current = *state;
            drop(state);
            log_debug!(
                self.inner.logger,
                "[RpcClient] {} #{} not sent, connection is {}",
                method,
                id,
                current
            );
            self.complete(completion, Err(RpcError::NotConnected));
            return id;
        };
        self.inner.pending.insert(id, completion);
        let queued = tx.send(Outbound::Text(text)).is_ok();
        drop(state);

        if queued {
            log_debug!(self.inner.logger, "[RpcClient] -> {} #{}", method, id);
        } else if let Some(completion) = self.inner.pending.take(id) {
            let error = RpcError::Transport("connection writer stopped".to_string());
            self.complete(completion, Err(error));
        }
        id
    }

    fn complete(&self, completion: Completion, outcome: RpcResult<Value>) {
        match completion {
            Completion::Channel(tx) => {
                let _ = tx.send(outcome);
            }
            Completion::Callback(callback) => {
                self.inner.dispatcher.dispatch(Box::new(move || callback(outcome)));
            }
        }
    }

    fn transition(&self, state: &mut ConnectionState, next: ConnectionState) {
        *state = next;
        self.inner.state_tx.send_replace(next);
    }

    fn notify<F>(&self, event: F)
    where
        F: FnOnce(&dyn ConnectionObserver) + Send + 'static,
    {
        let observer = self.inner.observer.clone();
        self.inner.dispatcher.dispatch(Box::new(move || event(observer.as_ref())));
    }

    /// Handshake finished; returns `false` if the client was closed meanwhile
    pub(crate) fn handle_open(&self, tx: mpsc::UnboundedSender<Outbound>) -> bool {
        {
            let mut state = self.inner.state.lock();
            if *state != ConnectionState::Connecting {
                return false;
            }
            *self.inner.outbound.lock() = Some(tx);
            self.transition(&mut state, ConnectionState::Open);
        }
        log_info!(self.inner.logger, "[RpcClient] Connected to {}", self.inner.url);
        self.notify(|observer| observer.on_connected());
        true
    }

    /// Route an inbound text frame to its pending request
    ///
    /// Anything that is not a response to an outstanding request is dropped.
    pub(crate) fn handle_text(&self, text: &str) {
        let state = self.state();
        if state != ConnectionState::Open {
            log_debug!(self.inner.logger, "[RpcClient] Ignoring frame, connection is {}", state);
            return;
        }
        let Some(response) = JsonRpcResponse::parse(text) else {
            log_debug!(
                self.inner.logger,
                "[RpcClient] Dropping non-response frame ({} bytes)",
                text.len()
            );
            return;
        };
        let id = response.id;
        match self.inner.pending.take(id) {
            Some(completion) => {
                log_debug!(self.inner.logger, "[RpcClient] <- #{}", id);
                self.complete(completion, response.into_outcome());
            }
            None => log_debug!(self.inner.logger, "[RpcClient] No pending request for id {}", id),
        }
    }

    pub(crate) fn handle_binary(&self, len: usize) {
        log_debug!(self.inner.logger, "[RpcClient] Ignoring binary frame ({} bytes)", len);
    }

    /// Handshake or socket failure: fail everything outstanding
    pub(crate) fn handle_failure(&self, reason: &str) {
        self.shut_down(ConnectionState::Failed, reason, false);
    }

    /// The server sent a close frame
    pub(crate) fn handle_remote_close(&self, reason: Option<String>) {
        let reason = reason
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "connection closed by server".to_string());
        self.shut_down(ConnectionState::Closed, &reason, false);
    }

    fn shut_down(&self, next: ConnectionState, reason: &str, send_close: bool) {
        let (tx, drained) = {
            let mut state = self.inner.state.lock();
            if !matches!(*state, ConnectionState::Connecting | ConnectionState::Open) {
                return;
            }
            if next == ConnectionState::Failed {
                *self.inner.last_error.lock() = Some(reason.to_string());
            }
            self.transition(&mut state, next);
            let tx = self.inner.outbound.lock().take();
            (tx, self.inner.pending.drain())
        };

        if send_close {
            if let Some(tx) = tx {
                let _ = tx.send(Outbound::Close);
            }
        }

        if next == ConnectionState::Failed {
            self.inner.logger.error(&format!(
                "[RpcClient] Connection to {} failed: {} ({} pending)",
                self.inner.url,
                reason,
                drained.len()
            ));
        } else {
            self.inner.logger.info(&format!(
                "[RpcClient] Connection to {} closed: {} ({} pending)",
                self.inner.url,
                reason,
                drained.len()
            ));
        }

        for (_, completion) in drained {
            let error = match next {
                ConnectionState::Failed => RpcError::Transport(reason.to_string()),
                _ => RpcError::Closed(reason.to_string()),
            };
            self.complete(completion, Err(error));
        }

        let reason = reason.to_string();
        if next == ConnectionState::Failed {
            self.notify(move |observer| observer.on_error(&reason));
        } else {
            self.notify(move |observer| observer.on_closed(&reason));
        }
    }

    /// Put the client in the open state without a socket
    #[cfg(test)]
    pub(crate) fn open_for_test(&self) -> mpsc::UnboundedReceiver<Outbound> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut state = self.inner.state.lock();
            self.transition(&mut state, ConnectionState::Connecting);
        }
        assert!(self.handle_open(tx));
        rx
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.inner.url)
            .field("state", &self.state())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Future for a request sent with [`RpcClient::call`]
#[derive(Debug)]
pub struct PendingCall {
    id: u64,
    rx: oneshot::Receiver<RpcResult<Value>>,
}

impl PendingCall {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for PendingCall {
    type Output = RpcResult<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(RpcError::Closed("request dropped".to_string())))
        })
    }
}
