//! Caller-supplied input for the three update modes.
//!
//! Patch types use `Option<T>` per field so that "absent from the request"
//! is distinguished from "explicitly set to an empty or zero value".

use common::ItemId;
use serde::Deserialize;

use super::{Money, OrderStatus};

fn default_quantity() -> u32 {
    1
}

/// A complete order description, used by create and full-replace modes.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub table_number: i32,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<ItemDraft>,
}

/// A complete line item description; every draft creates a new item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// A partial order update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPatch {
    pub table_number: Option<i32>,
    pub status: Option<OrderStatus>,
    pub items: Option<Vec<ItemPatch>>,
}

/// A partial line item descriptor within a patch.
///
/// With a truthy `id` it updates the matching existing item; without one it
/// describes a new item (`name` and `price` then become mandatory).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
}

impl ItemPatch {
    /// The id used for matching existing items.
    ///
    /// An id of 0 counts as "no id", i.e. the new-item branch.
    pub fn item_id(&self) -> Option<ItemId> {
        self.id.filter(|raw| *raw != 0).map(ItemId::new)
    }
}
