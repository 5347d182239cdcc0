use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, OrderItemId, UserId};
use domain::{NewOrder, Order, OrderItem, OrderStatus};
use tokio::sync::RwLock;

use crate::{OrderRepository, Result, StoreError};

/// In-memory order repository.
///
/// Backs the default wiring and the orchestration tests; behaves like the
/// PostgreSQL implementation, including id/timestamp assignment and the
/// items-loaded/not-loaded read split. Orders are kept in insertion
/// order.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    fn without_items(order: &Order) -> Order {
        Order {
            items: Vec::new(),
            ..order.clone()
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: NewOrder) -> Result<Order> {
        let id = OrderId::new();
        let now = Utc::now();
        let items: Vec<OrderItem> = order
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: OrderItemId::new(),
                order_id: id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                price: item.price,
                created_at: now,
            })
            .collect();

        let persisted = Order {
            id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: now,
            updated_at: now,
        };

        self.orders.write().await.push(persisted.clone());
        Ok(persisted)
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(StoreError::OrderNotFound(order.id))?;

        let updated = Order {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..order.clone()
        };
        *stored = updated.clone();
        Ok(updated)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|o| o.id == id)
            .map(Self::without_items))
    }

    async fn find_by_id_with_items(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .map(Self::without_items)
            .collect())
    }

    async fn find_by_user_id_with_items(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.clone())
    }
}
