//! The order orchestrator.

use clients::{PaymentGateway, ProductDirectory, UserDirectory};
use common::{OrderId, UserId};
use domain::{NewOrder, NewOrderItem, Order, OrderStatus};
use order_store::OrderRepository;

use crate::error::{OrchestrationError, Result};
use crate::requests::{OrderItemRequest, PaymentRequest};

/// Coordinates the order lifecycle across the repository, the product
/// and user directories, and the payment gateway.
///
/// All four collaborators are injected at construction; the orchestrator
/// holds no other state and keeps no process-wide registry. Remote and
/// repository calls within one use case run sequentially: item prices
/// depend on product lookups and the inventory commit depends on the
/// payment decision.
pub struct OrderOrchestrator<R, P, U, G>
where
    R: OrderRepository,
    P: ProductDirectory,
    U: UserDirectory,
    G: PaymentGateway,
{
    repository: R,
    products: P,
    users: U,
    gateway: G,
}

impl<R, P, U, G> OrderOrchestrator<R, P, U, G>
where
    R: OrderRepository,
    P: ProductDirectory,
    U: UserDirectory,
    G: PaymentGateway,
{
    /// Creates a new orchestrator.
    pub fn new(repository: R, products: P, users: U, gateway: G) -> Self {
        Self {
            repository,
            products,
            users,
            gateway,
        }
    }

    /// Creates an order for `user_id` in `Pending` status.
    ///
    /// Validates that the user exists, that every requested product
    /// exists, and that stock covers every requested quantity. Stock is
    /// only checked here, not reserved; the commit happens in
    /// [`process_payment`](Self::process_payment).
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        items: Vec<OrderItemRequest>,
    ) -> Result<Order> {
        let started = std::time::Instant::now();

        if items.is_empty() {
            return Err(OrchestrationError::InvalidOrder(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &items {
            if item.quantity == 0 {
                return Err(OrchestrationError::InvalidOrder(format!(
                    "quantity must be at least 1 for product {}",
                    item.product_id
                )));
            }
        }

        self.users.get_user(user_id).await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let product = self.products.get_product(item.product_id).await?;

            let available = self
                .products
                .check_stock(product.id, item.quantity)
                .await?;
            if !available {
                tracing::warn!(product_id = %product.id, requested = item.quantity, "stock check failed");
                return Err(OrchestrationError::InsufficientStock {
                    product_id: product.id,
                    requested: item.quantity,
                });
            }

            lines.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                price: product.price,
            });
        }

        let order = self.repository.save(NewOrder::pending(user_id, lines)).await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_creation_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");

        Ok(order)
    }

    /// Loads one order with items, enforcing that `caller_user_id` owns
    /// it.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_id(
        &self,
        order_id: OrderId,
        caller_user_id: UserId,
    ) -> Result<Order> {
        let order = self.load_order(order_id).await?;

        if !order.is_owned_by(caller_user_id) {
            tracing::warn!(%order_id, caller = %caller_user_id, "unauthorized order access");
            return Err(OrchestrationError::InvalidOrder(
                "you are not authorized to access this order".to_string(),
            ));
        }

        Ok(order)
    }

    /// All orders owned by `user_id`, items populated, storage order.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.repository.find_by_user_id_with_items(user_id).await?)
    }

    /// Every order in the system. Authorization is the boundary layer's
    /// concern, not enforced here.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_orders(&self) -> Result<Vec<Order>> {
        Ok(self.repository.find_all().await?)
    }

    /// All orders currently in `status`.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        Ok(self.repository.find_by_status(status).await?)
    }

    /// Moves an order to `new_status` if the state machine allows it.
    ///
    /// No inventory compensation happens here, even for a transition
    /// into `Cancelled`; only [`cancel_order`](Self::cancel_order)
    /// restores stock.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;

        if !order.status.can_transition(new_status) {
            return Err(OrchestrationError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        order.status = new_status;
        let updated = self.repository.update(&order).await?;
        tracing::info!(%order_id, status = %new_status, "order status updated");
        Ok(updated)
    }

    /// Cancels an order on behalf of its owner.
    ///
    /// If inventory had already been committed (status `Confirmed`), one
    /// restore call is issued per line item. Each restore is attempted
    /// independently; a failure is logged and swallowed so the
    /// cancellation itself still succeeds. No retry, no abort.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId, caller_user_id: UserId) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;

        if !order.is_owned_by(caller_user_id) {
            tracing::warn!(%order_id, caller = %caller_user_id, "unauthorized cancel attempt");
            return Err(OrchestrationError::InvalidOrder(
                "you are not authorized to cancel this order".to_string(),
            ));
        }

        if !order.can_be_cancelled() {
            return Err(OrchestrationError::InvalidOrder(format!(
                "order cannot be cancelled in current status: {}",
                order.status
            )));
        }

        if order.status == OrderStatus::Confirmed {
            for item in &order.items {
                match self
                    .products
                    .restore_inventory(item.product_id, item.quantity)
                    .await
                {
                    Ok(()) => {
                        tracing::info!(
                            %order_id,
                            product_id = %item.product_id,
                            quantity = item.quantity,
                            "restored inventory"
                        );
                    }
                    Err(err) => {
                        // Best-effort compensation: the cancellation must
                        // still go through.
                        tracing::error!(
                            %order_id,
                            product_id = %item.product_id,
                            error = %err,
                            "failed to restore inventory"
                        );
                    }
                }
            }
        }

        order.status = OrderStatus::Cancelled;
        let cancelled = self.repository.update(&order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");
        Ok(cancelled)
    }

    /// Takes payment for a pending order and commits its inventory.
    ///
    /// The payment amount must equal the order total exactly. On a
    /// positive gateway decision, one reduce call is issued per line
    /// item; this is where the stock checked at creation is actually
    /// consumed. A failure anywhere in that sequence surfaces as
    /// `PaymentFailed`; reductions already applied are not rolled back.
    #[tracing::instrument(skip(self, payment))]
    pub async fn process_payment(
        &self,
        order_id: OrderId,
        payment: PaymentRequest,
    ) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;

        if order.status != OrderStatus::Pending {
            return Err(OrchestrationError::InvalidOrder(format!(
                "order must be in PENDING status to process payment, current status: {}",
                order.status
            )));
        }

        if payment.amount != order.total_amount {
            tracing::warn!(
                %order_id,
                expected = %order.total_amount,
                received = %payment.amount,
                "payment amount mismatch"
            );
            return Err(OrchestrationError::PaymentFailed {
                reason: "payment amount does not match order total".to_string(),
            });
        }

        match self
            .gateway
            .authorize(order.id, payment.amount, &payment.payment_method)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(OrchestrationError::PaymentFailed {
                    reason: "payment was declined by the gateway".to_string(),
                });
            }
            Err(err) => {
                return Err(OrchestrationError::PaymentFailed {
                    reason: format!("gateway call failed: {err}"),
                });
            }
        }

        for item in &order.items {
            if let Err(err) = self
                .products
                .reduce_inventory(item.product_id, item.quantity)
                .await
            {
                // Reductions applied before this point stay applied.
                tracing::error!(
                    %order_id,
                    product_id = %item.product_id,
                    error = %err,
                    "inventory commit failed"
                );
                return Err(OrchestrationError::PaymentFailed {
                    reason: format!(
                        "inventory commit failed for product {}: {err}",
                        item.product_id
                    ),
                });
            }
            tracing::info!(
                %order_id,
                product_id = %item.product_id,
                quantity = item.quantity,
                "reduced inventory"
            );
        }

        order.status = OrderStatus::Confirmed;
        let confirmed = self.repository.update(&order).await?;

        metrics::counter!("payments_processed_total").increment(1);
        tracing::info!(%order_id, amount = %payment.amount, "payment processed");
        Ok(confirmed)
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Order> {
        self.repository
            .find_by_id_with_items(order_id)
            .await?
            .ok_or(OrchestrationError::ResourceNotFound {
                resource: "order",
                id: order_id.as_uuid(),
            })
    }
}
