//! Cart route handlers.
//!
//! Every mutation answers with the updated cart view so clients can re-render
//! without a second request.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use atelier_core::{UserId, WorkId};

use super::{Path, quantity_arg};
use crate::db::Store;
use crate::error::Result;
use crate::models::{CartView, OrderView};
use crate::services::{CartService, OrderService};
use crate::state::AppState;

/// Body of `POST /users/{user_id}/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub work_id: WorkId,
    /// Defaults to one unit.
    #[serde(default = "one")]
    pub quantity: i64,
}

const fn one() -> i64 {
    1
}

/// Body of `PUT /users/{user_id}/cart/items/{work_id}`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Show the user's cart.
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartView>> {
    let view = CartService::new(state.store()).view(user_id).await?;
    Ok(Json(view))
}

/// Add a work to the cart.
pub async fn add<S: Store>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<UserId>,
    payload: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let quantity = quantity_arg(request.quantity)?;

    let cart = CartService::new(state.store());
    cart.add_item(user_id, request.work_id, quantity).await?;
    Ok(Json(cart.view(user_id).await?))
}

/// Set the quantity of a line; zero removes it.
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path((user_id, work_id)): Path<(UserId, WorkId)>,
    payload: std::result::Result<Json<SetQuantityRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let quantity = quantity_arg(request.quantity)?;

    let cart = CartService::new(state.store());
    cart.set_quantity(user_id, work_id, quantity).await?;
    Ok(Json(cart.view(user_id).await?))
}

/// Remove a line from the cart.
pub async fn remove<S: Store>(
    State(state): State<AppState<S>>,
    Path((user_id, work_id)): Path<(UserId, WorkId)>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.store());
    cart.remove_item(user_id, work_id).await?;
    Ok(Json(cart.view(user_id).await?))
}

/// Turn the cart into an order.
pub async fn checkout<S: Store>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<UserId>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let orders = OrderService::new(state.store());
    let order = orders.checkout(user_id).await?;
    let view = orders.order_view(user_id, order.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
