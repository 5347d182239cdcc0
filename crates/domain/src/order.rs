//! Order and line-item entities.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// A priced line within a persisted order.
///
/// `product_name` and `price` are snapshots captured from the product
/// directory when the order was created and are never refreshed, so the
/// customer keeps the price they were quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,

    /// Back-reference to the owning order. Lookup only; ownership runs
    /// strictly from [`Order`] to its items.
    pub order_id: OrderId,

    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,

    /// Unit price snapshot at order-creation time.
    pub price: Money,

    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns `price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A persisted customer order.
///
/// Invariants maintained by the orchestrator and repository:
/// `total_amount` equals the sum of item subtotals, and the items list is
/// non-empty for any order that reached `Pending` or later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,

    /// Owning user. Immutable after creation.
    pub user_id: UserId,

    /// Line items in creation order.
    pub items: Vec<OrderItem>,

    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recomputes the total from the line items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// Returns true if the dedicated cancel path may cancel this order.
    pub fn can_be_cancelled(&self) -> bool {
        self.status.can_be_cancelled()
    }

    /// Returns true if `user_id` owns this order.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// An unsaved line item: the product snapshot taken during order creation,
/// before the repository has assigned ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
}

impl NewOrderItem {
    /// Returns `price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// An unsaved order, handed to the repository which assigns ids and
/// timestamps on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Builds a `Pending` draft, deriving the total from the items.
    pub fn pending(user_id: UserId, items: Vec<NewOrderItem>) -> Self {
        let total_amount = items.iter().map(NewOrderItem::subtotal).sum();
        Self {
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
        }
    }
}
