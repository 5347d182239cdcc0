//! Orchestration error kinds.

use clients::ClientError;
use common::ProductId;
use domain::OrderStatus;
use order_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// The closed set of failures an orchestrator operation can surface.
///
/// Callers are expected to match on the kind; the boundary layer maps
/// each kind to a transport status code. No internal stack trace or
/// remote-service detail leaks beyond the failing kind's message.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A referenced user, product, or order does not exist.
    #[error("{resource} not found with id: {id}")]
    ResourceNotFound { resource: &'static str, id: Uuid },

    /// Unauthorized access or an operation attempted in the wrong
    /// status.
    #[error("invalid order operation: {0}")]
    InvalidOrder(String),

    /// A status change outside the legal transition table.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Requested quantity exceeds available stock.
    #[error("insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
    },

    /// Amount mismatch, gateway decline, or any failure during the
    /// payment/inventory-commit sequence.
    #[error("payment failed: {reason}")]
    PaymentFailed { reason: String },

    /// A remote client call could not complete.
    #[error("service communication failure: {0}")]
    ServiceCommunication(String),

    /// The order store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ClientError> for OrchestrationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { resource, id } => {
                OrchestrationError::ResourceNotFound { resource, id }
            }
            ClientError::InsufficientStock {
                product_id,
                requested,
                ..
            } => OrchestrationError::InsufficientStock {
                product_id,
                requested,
            },
            ClientError::Communication(detail) => {
                OrchestrationError::ServiceCommunication(detail)
            }
        }
    }
}

/// Convenience type alias for orchestrator results.
pub type Result<T> = std::result::Result<T, OrchestrationError>;
