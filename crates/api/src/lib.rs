//! HTTP API server for the order orchestration engine.
//!
//! Thin boundary over the orchestrator: routes, request/response DTOs,
//! and the error-kind to status-code mapping, with structured logging
//! (tracing) and Prometheus metrics. Authentication is upstream's job;
//! the authenticated user id arrives as the `X-User-Id` header.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: OrderRepository + Clone + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/orders",
            post(routes::orders::create::<R>).get(routes::orders::list_all::<R>),
        )
        .route("/api/orders/user", get(routes::orders::list_for_user::<R>))
        .route(
            "/api/orders/status/{status}",
            get(routes::orders::list_by_status::<R>),
        )
        .route(
            "/api/orders/{id}",
            get(routes::orders::get_by_id::<R>).delete(routes::orders::cancel::<R>),
        )
        .route(
            "/api/orders/{id}/status",
            put(routes::orders::update_status::<R>),
        )
        .route(
            "/api/orders/{id}/payment",
            post(routes::orders::pay::<R>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: the given repository wired to
/// in-memory directories and the stub payment gateway.
pub fn create_default_state<R: OrderRepository + Clone + 'static>(
    repository: R,
) -> Arc<AppState<R>> {
    use clients::{InMemoryProductDirectory, InMemoryUserDirectory, StubPaymentGateway};
    use orchestrator::OrderOrchestrator;

    let products = InMemoryProductDirectory::new();
    let users = InMemoryUserDirectory::new();
    let gateway = StubPaymentGateway::new();

    let orchestrator = OrderOrchestrator::new(
        repository,
        products.clone(),
        users.clone(),
        gateway.clone(),
    );

    Arc::new(AppState {
        orchestrator,
        products,
        users,
        gateway,
    })
}
