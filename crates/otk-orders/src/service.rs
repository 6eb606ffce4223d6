//! Order service: the one place that sequences persist-then-broadcast.

use otk_db::{OrderStore, StoreError};
use otk_registry::BroadcastEngine;
use otk_schemas::{NewOrder, Order, OrderStatus, StatusChangeEvent};
use tracing::info;

use crate::{machine, OrderError};

/// Orchestrates store, state machine, and broadcast engine for the create /
/// update use cases. Constructed once at process start and shared by
/// reference; no global state.
pub struct OrderService {
    store: OrderStore,
    engine: BroadcastEngine,
}

impl OrderService {
    pub fn new(store: OrderStore, engine: BroadcastEngine) -> Self {
        Self { store, engine }
    }

    /// Read-only pass-through to the store.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list().await?)
    }

    /// Validate, persist, then broadcast. The broadcast happens strictly
    /// after the commit, so observers never see an unpersisted status.
    pub async fn create_order(&self, new: NewOrder) -> Result<Order, OrderError> {
        let draft = machine::validate_new(&new)?;
        let order = self.store.insert(&draft).await?;

        info!(order_id = order.id, symbol = %order.symbol, status = %order.status, "order created");
        self.announce(&order);
        Ok(order)
    }

    /// Fails with `NotFound` for unknown ids and `Validation` for unknown
    /// status strings or illegal transitions; nothing is broadcast on any
    /// failure path.
    ///
    /// The write is conditional on the status the legality check saw, so
    /// two racing updates on the same order can never both commit: the
    /// loser re-reads and re-validates against the committed status.
    pub async fn update_order_status(
        &self,
        id: i64,
        new_status: &str,
    ) -> Result<Order, OrderError> {
        // An unknown id outranks a malformed status string.
        let mut current = self.store.get(id).await?;
        let next = OrderStatus::parse(new_status)
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        loop {
            machine::check_transition(current.status, next)?;

            match self.store.update_status(id, current.status, next).await {
                Ok(order) => {
                    info!(order_id = order.id, status = %order.status, "order status updated");
                    self.announce(&order);
                    return Ok(order);
                }
                // Lost a race: another update committed first.
                Err(StoreError::StaleStatus { .. }) => {
                    current = self.store.get(id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn announce(&self, order: &Order) {
        self.engine.broadcast(&StatusChangeEvent {
            order_id: order.id,
            status: order.status,
        });
    }
}
