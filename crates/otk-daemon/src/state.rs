//! Shared runtime state for otk-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. Everything here is
//! constructed once at process start and passed by reference — no
//! process-wide singletons.

use std::sync::Arc;

use otk_db::OrderStore;
use otk_orders::OrderService;
use otk_registry::{BroadcastEngine, ConnectionRegistry};
use serde::Serialize;

/// Static build metadata included in the health response.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Shared across all Axum handlers via `Arc`.
pub struct AppState {
    pub build: BuildInfo,
    /// Live observer connections; the WebSocket handler registers here.
    pub registry: Arc<ConnectionRegistry>,
    /// Orchestrates store + state machine + broadcast engine.
    pub service: OrderService,
}

impl AppState {
    pub fn new(store: OrderStore) -> Self {
        let registry = Arc::new(ConnectionRegistry::default());
        let engine = BroadcastEngine::new(Arc::clone(&registry));

        Self {
            build: BuildInfo {
                service: "otk-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            registry,
            service: OrderService::new(store, engine),
        }
    }

    /// State backed by the embedded store; used by TESTING mode and the
    /// scenario tests.
    pub fn in_memory() -> Self {
        Self::new(OrderStore::memory())
    }
}
