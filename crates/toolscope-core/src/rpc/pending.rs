//! Outstanding-request table

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use super::error::RpcResult;

/// Completion callback for a single request
pub type Callback = Box<dyn FnOnce(RpcResult<Value>) + Send + 'static>;

/// How a pending request is completed
pub(crate) enum Completion {
    /// Posted through the client's dispatcher
    Callback(Callback),
    /// Sent straight to an awaiting future
    Channel(oneshot::Sender<RpcResult<Value>>),
}

/// Thread-safe id -> completion map
///
/// The caller inserts, the socket task removes; every entry is taken at most
/// once.
#[derive(Default)]
pub(crate) struct PendingTable {
    entries: Mutex<HashMap<u64, Completion>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and drops nothing) if `id` is already present
    pub fn insert(&self, id: u64, completion: Completion) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(id, completion);
        true
    }

    pub fn take(&self, id: u64) -> Option<Completion> {
        self.entries.lock().remove(&id)
    }

    /// Remove every entry, lowest id first
    pub fn drain(&self) -> Vec<(u64, Completion)> {
        let mut drained: Vec<_> = self.entries.lock().drain().collect();
        drained.sort_by_key(|(id, _)| *id);
        drained
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
