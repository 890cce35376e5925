//! Domain layer for the cafe manager.
//!
//! Pure order logic with no I/O: entities, the money value object, input
//! types for the three update modes (create, full replace, partial patch),
//! and the reconciliation functions that turn caller-supplied item lists
//! into validated change plans.

pub mod order;

pub use order::{
    ItemChange, ItemDraft, ItemPatch, ItemUpdate, Money, Order, OrderDraft, OrderError, OrderItem,
    OrderPatch, OrderStatus, ParseStatusError, order_total, plan_item_changes, validate_draft,
};
