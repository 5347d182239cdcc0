//! Client error types.

use common::ProductId;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the remote directory clients and the payment
/// gateway.
///
/// Business-level outcomes returned by a remote service (`NotFound`,
/// `InsufficientStock`) are distinct from a call that never completed
/// (`Communication`); the orchestrator maps each into its own error kind.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The referenced record does not exist in the remote directory.
    #[error("{resource} not found with id: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    /// The product's available quantity cannot cover the request.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The remote call could not complete at all.
    #[error("communication failure: {0}")]
    Communication(String),
}

/// Convenience type alias for client call results.
pub type Result<T> = std::result::Result<T, ClientError>;
