//! Reconciliation of caller-supplied item lists against an order.
//!
//! The store executes updates in three modes: create (every descriptor
//! makes a new item), full replace (existing items are discarded, then
//! create), and partial patch (descriptors are matched by id). The
//! functions here validate the input and produce a change plan without
//! touching storage, so a rejected request never leaves partial state.

use std::collections::HashSet;

use common::ItemId;

use super::{ItemDraft, ItemPatch, Money, OrderDraft, OrderError, OrderItem};

/// Field-by-field update for an existing item; `None` leaves a field as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
}

impl ItemUpdate {
    /// Merges the supplied fields into an existing item.
    pub fn apply_to(&self, item: &mut OrderItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
    }
}

/// One planned change to an order's item set.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemChange {
    /// Update the supplied fields on an item the order already owns.
    Update { id: ItemId, update: ItemUpdate },
    /// Create a new owned item.
    Create(ItemDraft),
}

/// Computes the derived order total: `sum(price * quantity)` over all items.
pub fn order_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

/// Validates a create/full-replace draft.
pub fn validate_draft(draft: &OrderDraft) -> Result<(), OrderError> {
    for item in &draft.items {
        if item.name.is_empty() {
            return Err(OrderError::MissingField { field: "name" });
        }
        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }
        if item.price.is_negative() {
            return Err(OrderError::InvalidPrice);
        }
    }
    Ok(())
}

/// Classifies patch descriptors against the order's current items.
///
/// Descriptors are processed in input order. The whole plan is rejected on
/// the first descriptor that references an item the order does not own,
/// repeats an id, or describes a new item without a name or price.
pub fn plan_item_changes(
    existing: &[OrderItem],
    patches: &[ItemPatch],
) -> Result<Vec<ItemChange>, OrderError> {
    let owned: HashSet<ItemId> = existing.iter().map(|item| item.id).collect();
    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut changes = Vec::with_capacity(patches.len());

    for patch in patches {
        if let Some(quantity) = patch.quantity
            && quantity == 0
        {
            return Err(OrderError::InvalidQuantity);
        }
        if let Some(price) = patch.price
            && price.is_negative()
        {
            return Err(OrderError::InvalidPrice);
        }

        match patch.item_id() {
            Some(id) => {
                if !owned.contains(&id) {
                    return Err(OrderError::UnknownItem { id });
                }
                if !seen.insert(id) {
                    return Err(OrderError::DuplicateItem { id });
                }
                changes.push(ItemChange::Update {
                    id,
                    update: ItemUpdate {
                        name: patch.name.clone(),
                        price: patch.price,
                        quantity: patch.quantity,
                    },
                });
            }
            None => {
                let name = patch
                    .name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .ok_or(OrderError::MissingField { field: "name" })?;
                let price = patch
                    .price
                    .ok_or(OrderError::MissingField { field: "price" })?;
                changes.push(ItemChange::Create(ItemDraft {
                    name,
                    price,
                    quantity: patch.quantity.unwrap_or(1),
                }));
            }
        }
    }

    Ok(changes)
}
