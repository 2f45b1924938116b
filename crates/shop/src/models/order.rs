//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{OrderId, OrderItemId, OrderStatus, Price, Quantity, UserId, WorkId};

use super::LineView;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One work in an order, priced when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub work_id: WorkId,
    pub quantity: Quantity,
    pub unit_price: Price,
}

/// An order with its lines and computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<LineView>,
    pub total: Price,
}

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}
