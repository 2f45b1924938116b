//! Core types for Atelier.
//!
//! This module provides type-safe wrappers for the order-management domain.

pub mod id;
pub mod price;
pub mod quantity;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use status::{OrderStatus, ParseOrderStatusError, TransitionError};
