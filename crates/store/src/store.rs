use async_trait::async_trait;
use common::OrderId;
use domain::{Money, Order, OrderDraft, OrderPatch, OrderStatus};

use crate::Result;

/// Optional narrowing criteria for order listings.
///
/// Both filters combine with logical AND; an absent filter imposes no
/// restriction.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Substring match on the decimal rendering of the table number.
    pub table: Option<String>,
    /// Exact status match.
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Creates an empty filter that matches every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the order satisfies every present criterion.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(table) = &self.table
            && !order.table_number.to_string().contains(table.as_str())
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        true
    }
}

/// Core trait for order store implementations.
///
/// Mutations recompute the order's derived total before returning, and
/// either apply completely or leave the order unchanged. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Creates an order with its initial item set (create mode).
    ///
    /// Every supplied item descriptor produces a new owned item; no id
    /// matching occurs.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order>;

    /// Loads an order with its items. Returns None if it does not exist.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders matching the filter, ordered by id.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Replaces an order wholesale (full-replace mode).
    ///
    /// All existing items are deleted, the draft's items are created as in
    /// create mode, and the order fields are overwritten from the draft.
    async fn replace_order(&self, id: OrderId, draft: OrderDraft) -> Result<Order>;

    /// Merges a partial update into an order (partial-patch mode).
    ///
    /// Present order fields overwrite; item descriptors with a matching id
    /// update that item, descriptors without an id create new items. A
    /// descriptor referencing an item the order does not own rejects the
    /// whole update.
    async fn patch_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order>;

    /// Deletes an order and all of its items.
    async fn delete_order(&self, id: OrderId) -> Result<()>;

    /// Sums `total_price` over all orders with status `paid`.
    ///
    /// Returns zero when no paid orders exist.
    async fn total_revenue(&self) -> Result<Money>;
}
