//! Order route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use atelier_core::{OrderId, OrderStatus, UserId, WorkId};

use super::{Path, quantity_arg};
use crate::db::Store;
use crate::error::Result;
use crate::models::{Order, OrderView, StatusChange};
use crate::services::{OrderService, ServiceError};
use crate::state::AppState;

/// One entry of a direct order.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub work_id: WorkId,
    pub quantity: i64,
}

/// Body of `POST /users/{user_id}/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

/// Body of `POST /users/{user_id}/orders/{order_id}/status`.
///
/// The status stays text here so an unknown value is reported as a
/// validation failure rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// List the user's orders, newest first.
pub async fn index<S: Store>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store()).list_orders(user_id).await?;
    Ok(Json(orders))
}

/// Place an order for explicit items.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<UserId>,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let Json(request) = payload?;
    let items = request
        .items
        .iter()
        .map(|line| Ok((line.work_id, quantity_arg(line.quantity)?)))
        .collect::<Result<Vec<_>>>()?;

    let orders = OrderService::new(state.store());
    let order = orders.create_order(user_id, &items).await?;
    let view = orders.order_view(user_id, order.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Show one order with its lines and total.
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    Path((user_id, order_id)): Path<(UserId, OrderId)>,
) -> Result<Json<OrderView>> {
    let view = OrderService::new(state.store())
        .order_view(user_id, order_id)
        .await?;
    Ok(Json(view))
}

/// Move an order along its lifecycle.
pub async fn transition<S: Store>(
    State(state): State<AppState<S>>,
    Path((user_id, order_id)): Path<(UserId, OrderId)>,
    payload: std::result::Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<OrderView>> {
    let Json(request) = payload?;
    let next: OrderStatus = request
        .status
        .trim()
        .parse()
        .map_err(ServiceError::from)?;

    let orders = OrderService::new(state.store());
    orders.get_order(user_id, order_id).await?;
    orders.transition_status(order_id, next).await?;
    Ok(Json(orders.order_view(user_id, order_id).await?))
}

/// Recorded status changes, oldest first.
pub async fn history<S: Store>(
    State(state): State<AppState<S>>,
    Path((user_id, order_id)): Path<(UserId, OrderId)>,
) -> Result<Json<Vec<StatusChange>>> {
    let history = OrderService::new(state.store())
        .status_history(user_id, order_id)
        .await?;
    Ok(Json(history))
}
