//! otk-orders
//!
//! The order state machine (pure transition logic) and the order service
//! that orchestrates store, state machine, and broadcast engine.

mod machine;
mod service;

pub use machine::{check_transition, validate_new};
pub use service::OrderService;

use otk_db::StoreError;

/// Failures surfaced by the order service. Broadcast-path failures are
/// recovered inside the engine and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Missing or malformed input on create, or an illegal status
    /// transition. Client error.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Update referencing an unknown order id. Client error.
    #[error("order {0} not found")]
    NotFound(i64),
    /// The backing store failed. Server error; the request fails but the
    /// process keeps running.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Store(other),
        }
    }
}
