use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use common::{Money, OrderId, OrderItemId, ProductId, UserId};
use domain::{NewOrder, Order, OrderItem, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{OrderRepository, Result, StoreError};

/// PostgreSQL-backed order repository.
///
/// An order and its items are written inside one transaction, so the
/// local write is atomic even though the remote calls around it are not.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            items: Vec::new(),
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            status: status.parse().map_err(StoreError::InvalidStatus)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            price: Money::from_cents(row.try_get("price_cents")?),
            created_at: row.try_get("created_at")?,
        })
    }

    async fn fetch_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, price_cents, created_at
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &rows {
            let item = Self::row_to_item(row)?;
            by_order
                .entry(item.order_id.as_uuid())
                .or_default()
                .push(item);
        }
        Ok(by_order)
    }

    async fn attach_items(&self, mut orders: Vec<Order>) -> Result<Vec<Order>> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let mut by_order = self.fetch_items(&ids).await?;
        for order in &mut orders {
            order.items = by_order.remove(&order.id.as_uuid()).unwrap_or_default();
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: NewOrder) -> Result<Order> {
        let id = OrderId::new();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_amount_cents, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for (position, item) in order.items.into_iter().enumerate() {
            let item_id = OrderItemId::new();
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, product_id, product_name, quantity, price_cents, position, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item_id.as_uuid())
            .bind(id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.price.cents())
            .bind(position as i32)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: item_id,
                order_id: id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                price: item.price,
                created_at: now,
            });
        }

        tx.commit().await?;
        tracing::debug!(order_id = %id, item_count = items.len(), "order saved");

        Ok(Order {
            id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, total_amount_cents = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order.id));
        }

        Ok(Order {
            updated_at: now,
            ..order.clone()
        })
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn find_by_id_with_items(&self, id: OrderId) -> Result<Option<Order>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut with_items = self.attach_items(vec![order]).await?;
        Ok(with_items.pop())
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_order).collect()
    }

    async fn find_by_user_id_with_items(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.find_by_user_id(user_id).await?;
        self.attach_items(orders).await
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders WHERE status = $1 ORDER BY created_at")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        let orders: Result<Vec<Order>> = rows.iter().map(Self::row_to_order).collect();
        self.attach_items(orders?).await
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        let orders: Result<Vec<Order>> = rows.iter().map(Self::row_to_order).collect();
        self.attach_items(orders?).await
    }
}
