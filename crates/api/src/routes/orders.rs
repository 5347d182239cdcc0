//! Order management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use clients::{InMemoryProductDirectory, InMemoryUserDirectory, StubPaymentGateway};
use common::{Money, OrderId, UserId};
use domain::{Order, OrderStatus};
use orchestrator::{OrderItemRequest, OrderOrchestrator, PaymentRequest};
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository> {
    pub orchestrator: OrderOrchestrator<
        R,
        InMemoryProductDirectory,
        InMemoryUserDirectory,
        StubPaymentGateway,
    >,
    pub products: InMemoryProductDirectory,
    pub users: InMemoryUserDirectory,
    pub gateway: StubPaymentGateway,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct PaymentRequestBody {
    pub amount_cents: i64,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItemResponse>,
    pub total_amount_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: common::OrderItemId,
    pub order_id: OrderId,
    pub product_id: common::ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    subtotal_cents: item.subtotal().cents(),
                    id: item.id,
                    order_id: item.order_id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price_cents: item.price.cents(),
                    created_at: item.created_at,
                })
                .collect(),
            total_amount_cents: order.total_amount.cents(),
            status: order.status.to_string(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// -- Helpers --

fn caller_user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get("X-User-Id")
        .ok_or_else(|| ApiError::BadRequest("missing X-User-Id header".to_string()))?;
    let raw = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("invalid X-User-Id header".to_string()))?;
    let uuid = Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid X-User-Id header: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    let uuid = Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

fn parse_status(raw: &str) -> Result<OrderStatus, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

// -- Handlers --

/// POST /api/orders — create an order for the authenticated user.
#[tracing::instrument(skip(state, req, headers))]
pub async fn create<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = caller_user_id(&headers)?;
    let order = state.orchestrator.create_order(user_id, req.items).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders/:id — load one order, enforcing ownership.
#[tracing::instrument(skip(state, headers))]
pub async fn get_by_id<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let user_id = caller_user_id(&headers)?;
    let order_id = parse_order_id(&id)?;
    let order = state
        .orchestrator
        .get_order_by_id(order_id, user_id)
        .await?;
    Ok(Json(order.into()))
}

/// GET /api/orders/user — all orders of the authenticated user.
#[tracing::instrument(skip(state, headers))]
pub async fn list_for_user<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user_id = caller_user_id(&headers)?;
    let orders = state.orchestrator.get_user_orders(user_id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders — every order. Admin-only by convention upstream.
#[tracing::instrument(skip(state))]
pub async fn list_all<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orchestrator.get_all_orders().await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/status/:status — orders currently in one status.
#[tracing::instrument(skip(state))]
pub async fn list_by_status<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let status = parse_status(&status)?;
    let orders = state.orchestrator.get_orders_by_status(status).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// PUT /api/orders/:id/status?status=S — admin status transition.
#[tracing::instrument(skip(state))]
pub async fn update_status<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status = parse_status(&query.status)?;
    let order = state
        .orchestrator
        .update_order_status(order_id, status)
        .await?;
    Ok(Json(order.into()))
}

/// DELETE /api/orders/:id — cancel an order on behalf of its owner.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let user_id = caller_user_id(&headers)?;
    let order_id = parse_order_id(&id)?;
    let order = state.orchestrator.cancel_order(order_id, user_id).await?;
    Ok(Json(order.into()))
}

/// POST /api/orders/:id/payment — take payment for a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn pay<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequestBody>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let payment = PaymentRequest {
        amount: Money::from_cents(req.amount_cents),
        payment_method: req.payment_method,
    };
    let order = state.orchestrator.process_payment(order_id, payment).await?;
    Ok(Json(order.into()))
}
