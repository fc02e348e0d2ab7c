//! Delivery of callbacks onto the thread that owns UI state
//!
//! The RPC client resolves requests on its socket task. Hosts with a
//! single-threaded UI (an editor's event thread, a JS main loop) inject a
//! [`Dispatcher`] so completions and connection events run where the host
//! expects them.
//!
//! ```rust
//! use std::sync::Arc;
//! use toolscope_core::dispatch::{DispatchQueue, Dispatcher};
//!
//! let queue = DispatchQueue::new();
//! let dispatcher: Arc<dyn Dispatcher> = Arc::new(queue.dispatcher());
//! dispatcher.dispatch(Box::new(|| println!("runs on the owning thread")));
//! assert_eq!(queue.run_pending(), 1);
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

/// A unit of work posted to the owning context
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// "Run on owning thread" primitive
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

pub type SharedDispatcher = Arc<dyn Dispatcher>;

/// Runs every task immediately on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Sending half of a [`DispatchQueue`]
#[derive(Clone)]
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<Task>,
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, task: Task) {
        // Receiver gone means the owning context shut down; nothing left to notify
        let _ = self.tx.send(task);
    }
}

impl std::fmt::Debug for QueueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueDispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Task queue drained by the owning thread
pub struct DispatchQueue {
    tx: mpsc::UnboundedSender<Task>,
    rx: parking_lot::Mutex<mpsc::UnboundedReceiver<Task>>,
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: parking_lot::Mutex::new(rx),
        }
    }

    /// A dispatcher that posts into this queue
    pub fn dispatcher(&self) -> QueueDispatcher {
        QueueDispatcher { tx: self.tx.clone() }
    }

    /// Run everything queued so far without waiting; returns how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the lock before running so a task may post again
            let next = self.rx.lock().try_recv();
            match next {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(_) => return ran,
            }
        }
    }

    /// Wait for the next task and run it
    ///
    /// The queue keeps a sender of its own, so this only returns after a task
    /// ran. Needs `&mut self`: the owning task is the only consumer.
    pub async fn run_next(&mut self) {
        if let Some(task) = self.rx.get_mut().recv().await {
            task();
        }
    }
}
