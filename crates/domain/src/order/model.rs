//! Order and line item entities as stored and served.

use chrono::{DateTime, Utc};
use common::{ItemId, OrderId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderStatus, order_total};

/// A single dish entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// The contribution of this line to the order total.
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A customer's tab for one table.
///
/// `total_price` is always derived from the owned items; the store
/// recomputes it after every item mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub table_number: i32,
    pub status: OrderStatus,
    pub total_price: Money,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Re-derives `total_price` from the current item set.
    pub fn recompute_total(&mut self) {
        self.total_price = order_total(&self.items);
    }

    /// Looks up an owned item by id.
    pub fn item(&self, id: ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
