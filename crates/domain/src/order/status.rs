//! Order status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order.
///
/// The floor can set any status at any time; there is no enforced
/// transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order taken, kitchen has not finished it yet.
    #[default]
    Pending,

    /// Dishes are ready to serve.
    Ready,

    /// The table has paid; the order counts toward revenue.
    Paid,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl OrderStatus {
    /// All statuses, in display order.
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Ready, OrderStatus::Paid];

    /// Returns the wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }

    /// Returns a human-readable label for the web pages.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Ready => "Ready",
            OrderStatus::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "ready" => Ok(OrderStatus::Ready),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
