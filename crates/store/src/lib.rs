//! Persistence layer for the cafe manager.
//!
//! The [`OrderStore`] trait covers the operations the HTTP layer needs:
//! the three update modes (create, full replace, partial patch), lookups
//! with optional filtering, cascade delete, and the paid-order revenue
//! aggregate. Two implementations are provided: an in-memory store for
//! tests and database-less deployments, and a PostgreSQL store.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::{OrderFilter, OrderStore};
