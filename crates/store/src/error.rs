use common::OrderId;
use domain::OrderError;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced order does not exist.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The supplied input failed validation.
    #[error(transparent)]
    Validation(#[from] OrderError),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
