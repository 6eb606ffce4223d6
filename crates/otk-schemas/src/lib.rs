//! otk-schemas
//!
//! Wire and storage types shared across the workspace. Pure data, no IO.

use serde::{Deserialize, Serialize};

/// A status string (create payload or update query) that is not a member of
/// the closed status/type sets.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of an order. Closed set; free-form status strings are
/// rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseEnumError {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }

    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderType
// ---------------------------------------------------------------------------

/// Side of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "buy",
            OrderType::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseEnumError> {
        match s {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            other => Err(ParseEnumError {
                kind: "order_type",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// A persisted trade order. `id` is assigned by the store on insert and is
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub symbol: String,
    pub price: f64,
    pub quantity: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
}

// ---------------------------------------------------------------------------
// NewOrder / OrderDraft
// ---------------------------------------------------------------------------

/// Inbound create payload, exactly as received. All fields optional so the
/// state machine can report which one is missing instead of the transport
/// rejecting the body wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub order_type: Option<String>,
    /// Optional explicit initial status; defaults to `pending`.
    pub status: Option<String>,
}

/// A create payload that passed validation. This is the only input the store
/// accepts for inserts.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub symbol: String,
    pub price: f64,
    pub quantity: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
}

// ---------------------------------------------------------------------------
// StatusChangeEvent
// ---------------------------------------------------------------------------

/// Pushed to every live observer connection when a status transition commits.
/// Not persisted; late joiners receive no backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub order_id: i64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(s.as_str()).unwrap(), s);
        }
        assert!(OrderStatus::parse("shipped").is_err());
    }

    #[test]
    fn order_type_round_trips_through_strings() {
        assert_eq!(OrderType::parse("buy").unwrap(), OrderType::Buy);
        assert_eq!(OrderType::parse("sell").unwrap(), OrderType::Sell);
        assert!(OrderType::parse("short").is_err());
    }

    #[test]
    fn event_serializes_with_lowercase_status() {
        let ev = StatusChangeEvent {
            order_id: 7,
            status: OrderStatus::Completed,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"order_id":7,"status":"completed"}"#);
    }

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
