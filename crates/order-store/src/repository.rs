use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{NewOrder, Order, OrderStatus};

use crate::Result;

/// Storage capability for orders.
///
/// The repository is the sole writer of generated ids and timestamps. A
/// `save` persists the order and its items as one atomic unit; every
/// remote call the orchestrator makes sits outside that atomic boundary.
///
/// Reads come in two shapes, mirroring eager and lazy item loading:
/// `find_by_id` / `find_by_user_id` return the order row with an empty
/// items list, while the `_with_items` variants load the line items in
/// creation order. `find_by_status` and `find_all` always load items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a draft order, assigning order/item ids and timestamps.
    async fn save(&self, order: NewOrder) -> Result<Order>;

    /// Persists a mutation of an existing order (status changes),
    /// refreshing `updated_at`. Fails with
    /// [`StoreError::OrderNotFound`](crate::StoreError::OrderNotFound)
    /// if the order was never saved.
    async fn update(&self, order: &Order) -> Result<Order>;

    /// Looks up one order without loading its items.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Looks up one order with its items eagerly loaded.
    async fn find_by_id_with_items(&self, id: OrderId) -> Result<Option<Order>>;

    /// All orders owned by a user, items not loaded, insertion order.
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// All orders owned by a user with items, insertion order.
    async fn find_by_user_id_with_items(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// All orders currently in `status`, with items.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>>;

    /// Every persisted order, with items, insertion order.
    async fn find_all(&self) -> Result<Vec<Order>>;
}
