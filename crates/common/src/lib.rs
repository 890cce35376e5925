//! Shared types for the cafe manager.

pub mod types;

pub use types::{ItemId, OrderId};
