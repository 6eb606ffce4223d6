//! otk-registry
//!
//! The live-observer connection registry and the broadcast engine that fans
//! status-change events out to it.
//!
//! Ownership model: the registry owns the sender half of one bounded queue
//! per connection; the transport task (WebSocket handler) owns the receiver
//! half and drains it into the socket. The broadcast engine only borrows a
//! point-in-time snapshot of sender handles, so registry mutation during a
//! broadcast pass can never corrupt iteration, and the registry lock is
//! never held across a send.

use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

mod broadcast;

pub use broadcast::BroadcastEngine;

/// Events queued per connection before a non-blocking enqueue fails and the
/// connection is treated as stalled.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// ConnectionId
// ---------------------------------------------------------------------------

/// Opaque handle identifying one registered observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone)]
pub(crate) struct ConnectionHandle {
    pub(crate) id: ConnectionId,
    pub(crate) tx: mpsc::Sender<String>,
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Authoritative set of live observer connections.
///
/// The mutex guards only set mutation and snapshot-taking; sends happen on
/// snapshots outside the lock.
pub struct ConnectionRegistry {
    queue_depth: usize,
    connections: Mutex<Vec<ConnectionHandle>>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_DEPTH)
    }
}

impl ConnectionRegistry {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            queue_depth,
            connections: Mutex::new(Vec::new()),
        }
    }

    /// Add a connection. Returns its id plus the receiver half of its event
    /// queue; the caller's transport task drains the receiver. The connection
    /// is tracked from the moment this returns — registration never
    /// half-succeeds.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let id = ConnectionId(Uuid::new_v4());
        self.lock_connections().push(ConnectionHandle { id, tx });
        (id, rx)
    }

    /// Remove a connection if present. Idempotent: unregistering an absent
    /// connection is a no-op. Dropping the sender half closes the queue,
    /// which ends the transport task's drain loop.
    pub fn unregister(&self, id: ConnectionId) {
        self.lock_connections().retain(|c| c.id != id);
    }

    /// Number of currently live connections.
    pub fn len(&self) -> usize {
        self.lock_connections().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_connections().is_empty()
    }

    /// Point-in-time copy of the live set for safe iteration by the
    /// broadcast engine.
    pub(crate) fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.lock_connections().clone()
    }

    fn lock_connections(&self) -> std::sync::MutexGuard<'_, Vec<ConnectionHandle>> {
        // The lock is only ever held for a push/retain/clone; a poisoned
        // mutex here means a panic mid-mutation, which we do not recover.
        match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
