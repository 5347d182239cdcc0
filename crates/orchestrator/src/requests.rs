//! Inbound request shapes consumed by the orchestrator.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// One requested line in an order-creation call.
///
/// Carries only the product reference and quantity; name and price are
/// snapshotted from the product directory by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A payment submission for a pending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Must equal the order's total exactly; no partial payment, no
    /// rounding tolerance.
    pub amount: Money,

    /// Free-form method label, e.g. `"CREDIT_CARD"`. Passed through to
    /// the gateway.
    pub payment_method: String,
}
