//! Order state machine. Pure logic, no IO: validates create payloads into
//! drafts and decides whether a requested status transition is legal.
//!
//! The lifecycle is a closed automaton, not a free-form label:
//!
//! ```text
//! pending ──> completed
//!    └──────> cancelled
//! ```
//!
//! Terminal states have no outgoing edges; self-transitions are illegal.

use otk_schemas::{NewOrder, OrderDraft, OrderStatus, OrderType};

use crate::OrderError;

/// Validate an inbound create payload into a draft the store will accept.
///
/// Required fields: `symbol` (non-empty), `price` (finite, ≥ 0), `quantity`
/// (> 0), `order_type`. An explicit initial `status` is honored as-is;
/// absent, the order starts `pending`.
pub fn validate_new(new: &NewOrder) -> Result<OrderDraft, OrderError> {
    let symbol = require(new.symbol.as_deref(), "symbol")?;
    if symbol.is_empty() {
        return Err(OrderError::Validation("symbol must be non-empty".into()));
    }

    let price = require(new.price, "price")?;
    if !price.is_finite() || price < 0.0 {
        return Err(OrderError::Validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }

    let quantity = require(new.quantity, "quantity")?;
    if quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }

    let order_type = OrderType::parse(require(new.order_type.as_deref(), "order_type")?)
        .map_err(|e| OrderError::Validation(e.to_string()))?;

    let status = match new.status.as_deref() {
        Some(s) => OrderStatus::parse(s).map_err(|e| OrderError::Validation(e.to_string()))?,
        None => OrderStatus::Pending,
    };

    Ok(OrderDraft {
        symbol: symbol.to_string(),
        price,
        quantity,
        order_type,
        status,
    })
}

/// Reject illegal transitions. Only `pending → completed` and
/// `pending → cancelled` are allowed.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    let legal = matches!(
        (from, to),
        (OrderStatus::Pending, OrderStatus::Completed)
            | (OrderStatus::Pending, OrderStatus::Cancelled)
    );
    if legal {
        Ok(())
    } else {
        Err(OrderError::Validation(format!(
            "illegal status transition: {from} -> {to}"
        )))
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, OrderError> {
    field.ok_or_else(|| OrderError::Validation(format!("missing field: {name}")))
}
