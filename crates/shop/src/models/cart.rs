//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{CartId, CartItemId, Price, Quantity, UserId, WorkId};

use super::LineView;

/// A user's single shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    /// Owner; unique across carts.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// One work in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub work_id: WorkId,
    pub quantity: Quantity,
}

/// Cart contents as shown to the user, with computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// `None` until the user first adds something.
    pub cart_id: Option<CartId>,
    pub user_id: UserId,
    pub items: Vec<LineView>,
    /// Sum of quantities across lines.
    pub item_count: u64,
    pub total: Price,
}

impl CartView {
    /// The view of a user who has no cart yet.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            cart_id: None,
            user_id,
            items: Vec::new(),
            item_count: 0,
            total: Price::ZERO,
        }
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
