//! Embedded in-memory backend. Selected by `TESTING=true` and used by the
//! scenario tests; mirrors the Postgres backend's semantics (id assignment
//! from 1, read-after-write per id).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use otk_schemas::{Order, OrderDraft, OrderStatus};
use tokio::sync::RwLock;

use crate::StoreError;

pub struct MemoryStore {
    next_id: AtomicI64,
    rows: RwLock<BTreeMap<i64, Order>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) async fn list(&self) -> Vec<Order> {
        self.rows.read().await.values().cloned().collect()
    }

    pub(crate) async fn get(&self, id: i64) -> Result<Order, StoreError> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub(crate) async fn insert(&self, draft: &OrderDraft) -> Order {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let order = Order {
            id,
            symbol: draft.symbol.clone(),
            price: draft.price,
            quantity: draft.quantity,
            order_type: draft.order_type,
            status: draft.status,
        };
        self.rows.write().await.insert(id, order.clone());
        order
    }

    pub(crate) async fn update_status(
        &self,
        id: i64,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        // Re-check the prior status under the write lock so a concurrent
        // update between the caller's read and this write cannot land twice.
        let mut rows = self.rows.write().await;
        let order = rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if order.status != expected {
            return Err(StoreError::StaleStatus { id, expected });
        }
        order.status = status;
        Ok(order.clone())
    }
}
