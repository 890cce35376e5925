use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{ItemId, OrderId};
use domain::{
    ItemChange, ItemDraft, Money, Order, OrderDraft, OrderItem, OrderPatch, OrderStatus,
    plan_item_changes, validate_draft,
};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{OrderFilter, OrderStore},
};

#[derive(Default)]
struct Inner {
    orders: BTreeMap<OrderId, Order>,
    next_order_id: i64,
    next_item_id: i64,
}

impl Inner {
    fn next_order_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        OrderId::new(self.next_order_id)
    }

    fn new_item(&mut self, draft: ItemDraft) -> OrderItem {
        self.next_item_id += 1;
        OrderItem {
            id: ItemId::new(self.next_item_id),
            name: draft.name,
            price: draft.price,
            quantity: draft.quantity,
        }
    }
}

/// In-memory order store implementation.
///
/// Provides the same interface and update semantics as the PostgreSQL
/// implementation; used in tests and as the backend when no database is
/// configured. The write lock is held for the whole of each mutation, so
/// a rejected patch leaves the order unchanged.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Returns the total number of line items across all orders.
    pub async fn item_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.orders.values().map(|o| o.items.len()).sum()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.inner.write().await.orders.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        validate_draft(&draft)?;

        let mut inner = self.inner.write().await;
        let id = inner.next_order_id();
        let items: Vec<OrderItem> = draft
            .items
            .into_iter()
            .map(|item| inner.new_item(item))
            .collect();

        let mut order = Order {
            id,
            table_number: draft.table_number,
            status: draft.status,
            total_price: Money::zero(),
            items,
            created_at: Utc::now(),
        };
        order.recompute_total();

        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn replace_order(&self, id: OrderId, draft: OrderDraft) -> Result<Order> {
        validate_draft(&draft)?;

        let mut inner = self.inner.write().await;
        if !inner.orders.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        // Existing items are discarded wholesale; ids in the draft are
        // never matched.
        let items: Vec<OrderItem> = draft
            .items
            .into_iter()
            .map(|item| inner.new_item(item))
            .collect();

        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        order.table_number = draft.table_number;
        order.status = draft.status;
        order.items = items;
        order.recompute_total();

        Ok(order.clone())
    }

    async fn patch_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let existing = inner.orders.get(&id).ok_or(StoreError::NotFound(id))?;

        // Plan against the current item set before mutating anything, so a
        // rejected descriptor cannot leave partial state behind.
        let changes = match &patch.items {
            Some(patches) => Some(plan_item_changes(&existing.items, patches)?),
            None => None,
        };

        let mut created = Vec::new();
        if let Some(changes) = &changes {
            for change in changes {
                if let ItemChange::Create(draft) = change {
                    created.push(inner.new_item(draft.clone()));
                }
            }
        }
        let mut created = created.into_iter();

        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(table_number) = patch.table_number {
            order.table_number = table_number;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }

        if let Some(changes) = changes {
            for change in changes {
                match change {
                    ItemChange::Update { id, update } => {
                        let item = order
                            .items
                            .iter_mut()
                            .find(|item| item.id == id)
                            .expect("planned update targets an owned item");
                        update.apply_to(item);
                    }
                    ItemChange::Create(_) => {
                        order
                            .items
                            .push(created.next().expect("one created item per create change"));
                    }
                }
            }
        }

        order.recompute_total();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut inner = self.inner.write().await;
        // Items live inside the order, so removal cascades by construction.
        inner
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn total_revenue(&self) -> Result<Money> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|order| order.status == OrderStatus::Paid)
            .map(|order| order.total_price)
            .sum())
    }
}
