//! Fan-out of one event to every live connection.

use std::sync::Arc;

use otk_schemas::StatusChangeEvent;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, warn};

use crate::{ConnectionId, ConnectionRegistry};

/// Delivers committed status changes to every registered connection,
/// isolating per-connection failure from the rest of the pass and from the
/// caller.
#[derive(Clone)]
pub struct BroadcastEngine {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastEngine {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Serialize `event` once and enqueue it to every connection in a
    /// snapshot of the registry. Enqueues are non-blocking: a connection
    /// whose bounded queue is full (stalled peer) or closed (peer gone)
    /// fails the attempt immediately instead of stalling the pass.
    ///
    /// Failed connections are unregistered after the pass completes, never
    /// mid-iteration; their undelivered events are dropped. Nothing here
    /// surfaces to the caller. Returns the number of successful deliveries.
    pub fn broadcast(&self, event: &StatusChangeEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                error!(order_id = event.order_id, error = %e, "event serialization failed");
                return 0;
            }
        };

        let snapshot = self.registry.snapshot();
        let mut delivered = 0usize;
        let mut failed: Vec<ConnectionId> = Vec::new();

        for conn in &snapshot {
            match conn.tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(conn = %conn.id, "observer queue full; evicting stalled connection");
                    failed.push(conn.id);
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(conn = %conn.id, "observer queue closed; evicting connection");
                    failed.push(conn.id);
                }
            }
        }

        for id in failed {
            self.registry.unregister(id);
        }

        delivered
    }
}
