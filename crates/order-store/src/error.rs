use common::OrderId;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An update referenced an order id that is not persisted.
    #[error("order not found in store: {0}")]
    OrderNotFound(OrderId),

    /// A stored status string could not be parsed.
    #[error("invalid stored status: {0}")]
    InvalidStatus(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
