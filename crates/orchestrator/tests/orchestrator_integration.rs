//! Integration tests for the order orchestrator.
//!
//! Every test runs against the in-memory repository and directories, so
//! stock levels and persisted orders can be inspected after each
//! operation.

use clients::{
    InMemoryProductDirectory, InMemoryUserDirectory, ProductDirectory, StubPaymentGateway,
};
use common::{Money, OrderId, ProductId, UserId};
use domain::{Order, OrderStatus};
use orchestrator::{OrchestrationError, OrderItemRequest, OrderOrchestrator, PaymentRequest};
use order_store::{InMemoryOrderRepository, OrderRepository};

type TestOrchestrator = OrderOrchestrator<
    InMemoryOrderRepository,
    InMemoryProductDirectory,
    InMemoryUserDirectory,
    StubPaymentGateway,
>;

struct TestHarness {
    orchestrator: TestOrchestrator,
    repository: InMemoryOrderRepository,
    products: InMemoryProductDirectory,
    users: InMemoryUserDirectory,
    gateway: StubPaymentGateway,
    user_id: UserId,
    /// 10.00 each, 10 in stock.
    widget: ProductId,
    /// 5.00 each, 5 in stock.
    gadget: ProductId,
}

impl TestHarness {
    fn new() -> Self {
        let repository = InMemoryOrderRepository::new();
        let products = InMemoryProductDirectory::new();
        let users = InMemoryUserDirectory::new();
        let gateway = StubPaymentGateway::new();

        let user_id = users.add_user("ada", "ada@example.com", "Ada Lovelace");
        let widget = products.add_product("Widget", Money::from_cents(1000), 10);
        let gadget = products.add_product("Gadget", Money::from_cents(500), 5);

        let orchestrator = OrderOrchestrator::new(
            repository.clone(),
            products.clone(),
            users.clone(),
            gateway.clone(),
        );

        Self {
            orchestrator,
            repository,
            products,
            users,
            gateway,
            user_id,
            widget,
            gadget,
        }
    }

    /// Creates the reference order: 2 widgets + 1 gadget, total 25.00.
    async fn create_order(&self) -> Order {
        self.orchestrator
            .create_order(
                self.user_id,
                vec![
                    OrderItemRequest {
                        product_id: self.widget,
                        quantity: 2,
                    },
                    OrderItemRequest {
                        product_id: self.gadget,
                        quantity: 1,
                    },
                ],
            )
            .await
            .unwrap()
    }

    fn payment(cents: i64) -> PaymentRequest {
        PaymentRequest {
            amount: Money::from_cents(cents),
            payment_method: "CREDIT_CARD".to_string(),
        }
    }

    /// Forces a stored order into `status`, bypassing the state machine.
    async fn force_status(&self, order: &Order, status: OrderStatus) -> Order {
        let mut copy = order.clone();
        copy.status = status;
        self.repository.update(&copy).await.unwrap()
    }
}

// -- creation --

#[tokio::test]
async fn create_order_persists_pending_with_exact_total() {
    let h = TestHarness::new();

    let order = h.create_order().await;

    assert_eq!(order.user_id, h.user_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Money::from_cents(2500));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, h.widget);
    assert_eq!(order.items[0].product_name, "Widget");
    assert_eq!(order.items[0].price, Money::from_cents(1000));
    assert_eq!(order.items[0].subtotal(), Money::from_cents(2000));
    assert_eq!(order.items[1].subtotal(), Money::from_cents(500));
    assert_eq!(order.items_total(), order.total_amount);
    for item in &order.items {
        assert_eq!(item.order_id, order.id);
    }
}

#[tokio::test]
async fn create_order_checks_but_does_not_reserve_stock() {
    let h = TestHarness::new();

    h.create_order().await;

    assert_eq!(h.products.quantity_of(h.widget), Some(10));
    assert_eq!(h.products.quantity_of(h.gadget), Some(5));
}

#[tokio::test]
async fn create_order_rejects_empty_items() {
    let h = TestHarness::new();

    let result = h.orchestrator.create_order(h.user_id, vec![]).await;
    assert!(matches!(result, Err(OrchestrationError::InvalidOrder(_))));
}

#[tokio::test]
async fn create_order_rejects_zero_quantity() {
    let h = TestHarness::new();

    let result = h
        .orchestrator
        .create_order(
            h.user_id,
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 0,
            }],
        )
        .await;
    assert!(matches!(result, Err(OrchestrationError::InvalidOrder(_))));
}

#[tokio::test]
async fn create_order_for_unknown_user_fails() {
    let h = TestHarness::new();

    let result = h
        .orchestrator
        .create_order(
            UserId::new(),
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 1,
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::ResourceNotFound {
            resource: "user",
            ..
        })
    ));
    assert_eq!(h.repository.order_count().await, 0);
}

#[tokio::test]
async fn create_order_for_unknown_product_fails() {
    let h = TestHarness::new();

    let result = h
        .orchestrator
        .create_order(
            h.user_id,
            vec![OrderItemRequest {
                product_id: ProductId::new(),
                quantity: 1,
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::ResourceNotFound {
            resource: "product",
            ..
        })
    ));
}

#[tokio::test]
async fn create_order_with_insufficient_stock_fails() {
    let h = TestHarness::new();

    let result = h
        .orchestrator
        .create_order(
            h.user_id,
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 11,
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::InsufficientStock { requested: 11, .. })
    ));
    assert_eq!(h.repository.order_count().await, 0);
}

#[tokio::test]
async fn create_order_surfaces_directory_outage_as_communication_failure() {
    let h = TestHarness::new();
    h.users.set_unreachable(true);

    let result = h
        .orchestrator
        .create_order(
            h.user_id,
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 1,
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::ServiceCommunication(_))
    ));
}

// -- reads --

#[tokio::test]
async fn get_order_by_id_enforces_ownership() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let loaded = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(loaded.id, order.id);

    let stranger = h.users.add_user("bob", "bob@example.com", "Bob");
    let result = h.orchestrator.get_order_by_id(order.id, stranger).await;
    assert!(matches!(result, Err(OrchestrationError::InvalidOrder(_))));
}

#[tokio::test]
async fn get_order_by_id_is_idempotent() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let first = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    let second = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn get_missing_order_fails_not_found() {
    let h = TestHarness::new();

    let result = h
        .orchestrator
        .get_order_by_id(OrderId::new(), h.user_id)
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::ResourceNotFound {
            resource: "order",
            ..
        })
    ));
}

#[tokio::test]
async fn get_user_orders_returns_only_own_orders_with_items() {
    let h = TestHarness::new();
    let first = h.create_order().await;
    let second = h.create_order().await;

    let bob = h.users.add_user("bob", "bob@example.com", "Bob");
    h.orchestrator
        .create_order(
            bob,
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let orders = h.orchestrator.get_user_orders(h.user_id).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, first.id);
    assert_eq!(orders[1].id, second.id);
    assert!(orders.iter().all(|o| !o.items.is_empty()));
}

#[tokio::test]
async fn get_all_orders_spans_users() {
    let h = TestHarness::new();
    h.create_order().await;

    let bob = h.users.add_user("bob", "bob@example.com", "Bob");
    h.orchestrator
        .create_order(
            bob,
            vec![OrderItemRequest {
                product_id: h.widget,
                quantity: 1,
            }],
        )
        .await
        .unwrap();

    let orders = h.orchestrator.get_all_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn get_orders_by_status_filters() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.create_order().await;

    h.orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();

    let confirmed = h
        .orchestrator
        .get_orders_by_status(OrderStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, order.id);

    let pending = h
        .orchestrator
        .get_orders_by_status(OrderStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

// -- status transitions --

#[tokio::test]
async fn update_order_status_matches_transition_table_for_every_pair() {
    let legal = [
        (OrderStatus::Pending, OrderStatus::Confirmed),
        (OrderStatus::Pending, OrderStatus::Cancelled),
        (OrderStatus::Confirmed, OrderStatus::Shipped),
        (OrderStatus::Confirmed, OrderStatus::Cancelled),
        (OrderStatus::Shipped, OrderStatus::Delivered),
    ];

    for from in OrderStatus::ALL {
        for to in OrderStatus::ALL {
            let h = TestHarness::new();
            let order = h.create_order().await;
            let order = h.force_status(&order, from).await;

            let result = h.orchestrator.update_order_status(order.id, to).await;
            if legal.contains(&(from, to)) {
                let updated = result.unwrap();
                assert_eq!(updated.status, to, "transition {from} -> {to}");
            } else {
                assert!(
                    matches!(
                        result,
                        Err(OrchestrationError::InvalidTransition { from: f, to: t })
                            if f == from && t == to
                    ),
                    "transition {from} -> {to} should be rejected"
                );
            }
        }
    }
}

#[tokio::test]
async fn pending_to_shipped_is_rejected() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let result = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Shipped)
        .await;
    assert!(matches!(
        result,
        Err(OrchestrationError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped,
        })
    ));
}

#[tokio::test]
async fn update_status_into_cancelled_skips_inventory_compensation() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();
    assert_eq!(h.products.quantity_of(h.widget), Some(8));

    // The generic status update cancels without restoring stock; only
    // the dedicated cancel path compensates.
    let updated = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert_eq!(h.products.quantity_of(h.widget), Some(8));
    assert_eq!(h.products.quantity_of(h.gadget), Some(4));
}

// -- payment --

#[tokio::test]
async fn exact_payment_confirms_order_and_commits_inventory() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let confirmed = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();

    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert_eq!(h.products.quantity_of(h.widget), Some(8));
    assert_eq!(h.products.quantity_of(h.gadget), Some(4));
    assert_eq!(h.gateway.authorized_count(), 1);
}

#[tokio::test]
async fn payment_off_by_one_cent_fails_and_leaves_everything_untouched() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let result = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2499))
        .await;

    assert!(matches!(
        result,
        Err(OrchestrationError::PaymentFailed { .. })
    ));
    let reloaded = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
    assert_eq!(h.products.quantity_of(h.widget), Some(10));
    assert_eq!(h.products.quantity_of(h.gadget), Some(5));
    assert_eq!(h.gateway.authorized_count(), 0);
}

#[tokio::test]
async fn payment_can_only_be_taken_once() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    h.orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();

    let result = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await;
    assert!(matches!(result, Err(OrchestrationError::InvalidOrder(_))));
    // Inventory was committed exactly once.
    assert_eq!(h.products.quantity_of(h.widget), Some(8));
}

#[tokio::test]
async fn gateway_decline_fails_payment_without_touching_inventory() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.gateway.set_decline(true);

    let result = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await;

    assert!(matches!(
        result,
        Err(OrchestrationError::PaymentFailed { .. })
    ));
    assert_eq!(h.products.quantity_of(h.widget), Some(10));
    let reloaded = h.orchestrator.get_order_by_id(order.id, h.user_id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
}

#[tokio::test]
async fn gateway_outage_surfaces_as_payment_failure() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.gateway.set_unreachable(true);

    let result = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await;

    assert!(matches!(
        result,
        Err(OrchestrationError::PaymentFailed { .. })
    ));
    assert_eq!(h.products.quantity_of(h.widget), Some(10));
}

#[tokio::test]
async fn partial_inventory_commit_is_not_rolled_back() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    // A concurrent consumer drains the gadget stock between the creation
    // check and the payment commit.
    h.products.reduce_inventory(h.gadget, 5).await.unwrap();

    let result = h
        .orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await;

    assert!(matches!(
        result,
        Err(OrchestrationError::PaymentFailed { .. })
    ));
    // The widget reduction that preceded the failure stays applied.
    assert_eq!(h.products.quantity_of(h.widget), Some(8));
    assert_eq!(h.products.quantity_of(h.gadget), Some(0));
    let reloaded = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
}

// -- cancellation --

#[tokio::test]
async fn cancelling_pending_order_issues_no_restores() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let cancelled = h
        .orchestrator
        .cancel_order(order.id, h.user_id)
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.products.quantity_of(h.widget), Some(10));
    assert_eq!(h.products.quantity_of(h.gadget), Some(5));
}

#[tokio::test]
async fn cancelling_confirmed_order_restores_each_item() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();
    assert_eq!(h.products.quantity_of(h.widget), Some(8));

    let cancelled = h
        .orchestrator
        .cancel_order(order.id, h.user_id)
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.products.quantity_of(h.widget), Some(10));
    assert_eq!(h.products.quantity_of(h.gadget), Some(5));
}

#[tokio::test]
async fn cancelling_shipped_or_terminal_order_fails_without_restores() {
    for status in [
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let h = TestHarness::new();
        let order = h.create_order().await;
        let order = h.force_status(&order, status).await;

        let result = h.orchestrator.cancel_order(order.id, h.user_id).await;
        assert!(
            matches!(result, Err(OrchestrationError::InvalidOrder(_))),
            "cancel in {status} should fail"
        );
        assert_eq!(h.products.quantity_of(h.widget), Some(10));
    }
}

#[tokio::test]
async fn cancel_requires_ownership() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    let stranger = h.users.add_user("bob", "bob@example.com", "Bob");

    let result = h.orchestrator.cancel_order(order.id, stranger).await;
    assert!(matches!(result, Err(OrchestrationError::InvalidOrder(_))));

    let reloaded = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
}

#[tokio::test]
async fn cancellation_succeeds_even_when_restores_fail() {
    let h = TestHarness::new();
    let order = h.create_order().await;
    h.orchestrator
        .process_payment(order.id, TestHarness::payment(2500))
        .await
        .unwrap();

    h.products.set_unreachable(true);
    let cancelled = h
        .orchestrator
        .cancel_order(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // The failed restores are not retried; the stock stays consumed.
    h.products.set_unreachable(false);
    assert_eq!(h.products.quantity_of(h.widget), Some(8));
    assert_eq!(h.products.quantity_of(h.gadget), Some(4));
}

// -- invariants --

#[tokio::test]
async fn total_amount_invariant_holds_on_every_read_path() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    let by_id = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();
    assert_eq!(by_id.items_total(), by_id.total_amount);

    for o in h.orchestrator.get_user_orders(h.user_id).await.unwrap() {
        assert_eq!(o.items_total(), o.total_amount);
    }
    for o in h.orchestrator.get_all_orders().await.unwrap() {
        assert_eq!(o.items_total(), o.total_amount);
    }
}

#[tokio::test]
async fn price_snapshot_is_stable_after_creation() {
    let h = TestHarness::new();
    let order = h.create_order().await;

    // The directory's price changes after the order was created.
    h.products.set_price(h.widget, Money::from_cents(9900));
    let reloaded = h
        .orchestrator
        .get_order_by_id(order.id, h.user_id)
        .await
        .unwrap();

    assert_eq!(reloaded.items[0].price, Money::from_cents(1000));
    assert_eq!(reloaded.total_amount, Money::from_cents(2500));
}
