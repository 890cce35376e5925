//! Order entities and related types.

mod input;
mod model;
mod reconcile;
mod status;
mod value_objects;

pub use input::{ItemDraft, ItemPatch, OrderDraft, OrderPatch};
pub use model::{Order, OrderItem};
pub use reconcile::{ItemChange, ItemUpdate, order_total, plan_item_changes, validate_draft};
pub use status::{OrderStatus, ParseStatusError};
pub use value_objects::Money;

use common::ItemId;
use thiserror::Error;

/// Validation errors raised while reconciling an order update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A new-item descriptor is missing a mandatory field.
    #[error("{field} is required for new items")]
    MissingField { field: &'static str },

    /// A patch descriptor referenced an item the order does not own.
    #[error("item {id} does not belong to this order")]
    UnknownItem { id: ItemId },

    /// The same item id appeared more than once in a single request.
    #[error("item {id} appears more than once in the request")]
    DuplicateItem { id: ItemId },

    /// A quantity of zero was supplied.
    #[error("quantity must be greater than 0")]
    InvalidQuantity,

    /// A negative price was supplied.
    #[error("price must not be negative")]
    InvalidPrice,
}

impl OrderError {
    /// The input field this error should be reported against.
    pub fn field(&self) -> &'static str {
        match self {
            OrderError::MissingField { field } => field,
            OrderError::UnknownItem { .. } | OrderError::DuplicateItem { .. } => "items",
            OrderError::InvalidQuantity => "quantity",
            OrderError::InvalidPrice => "price",
        }
    }
}
