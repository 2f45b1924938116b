//! Order status lifecycle.
//!
//! ```text
//! pending ──► processing ──► shipped ──► delivered
//!    │             │            │
//!    └─────────────┴────────────┴──► cancelled
//!
//! any status ──► deleted   (soft delete)
//! ```
//!
//! `delivered` and `cancelled` end fulfilment; the only move left from them is
//! soft deletion. `deleted` has no outgoing edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// Soft-deleted; hidden from customer listings.
    #[serde(alias = "Deleted")]
    Deleted,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Unknown status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Deleted,
    ];

    /// Storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Deleted => "deleted",
        }
    }

    /// Whether fulfilment has finished for this order.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Deleted)
    }

    /// Whether `next` is directly reachable from `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending | Self::Processing | Self::Shipped, Self::Cancelled)
                | (
                    Self::Pending
                        | Self::Processing
                        | Self::Shipped
                        | Self::Delivered
                        | Self::Cancelled,
                    Self::Deleted
                )
        )
    }

    /// Validate a move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the lifecycle has no such edge.
    pub const fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    /// Statuses reachable in one step.
    pub fn next_statuses(self) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |next| self.can_transition_to(*next))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            // Legacy rows used a capitalised value for soft deletes.
            "deleted" | "Deleted" => Ok(Self::Deleted),
            _ => Err(ParseOrderStatusError(s.to_owned())),
        }
    }
}
