//! Business operations on catalog, carts and orders.
//!
//! Services validate raw input at the boundary, call the repositories and
//! compute totals. They are cheap borrowing wrappers over a [`Store`](crate::db::Store)
//! and are built per request:
//!
//! ```rust,ignore
//! let view = CartService::new(state.store()).view(user_id).await?;
//! ```

pub mod cart;
pub mod catalog;
pub mod order;

use thiserror::Error;

use atelier_core::{
    ParseOrderStatusError, PriceError, PricingError, QuantityError, TransitionError,
};

use crate::db::RepositoryError;
use crate::models::WorkValidationError;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use order::OrderService;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input the caller can correct.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Status change not allowed by the order lifecycle.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A referenced work, cart, cart line or order does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Stored data or a storage constraint contradicts the operation.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Storage failed.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl ServiceError {
    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Whether the caller can fix the error by changing the request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidTransition(_) | Self::NotFound(_)
        )
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record".to_owned()),
            RepositoryError::Conflict(msg) | RepositoryError::DataCorruption(msg) => {
                Self::Integrity(msg)
            }
            RepositoryError::Database(_) => Self::Repository(err),
        }
    }
}

impl From<PricingError> for ServiceError {
    fn from(err: PricingError) -> Self {
        Self::Integrity(err.to_string())
    }
}

impl From<PriceError> for ServiceError {
    fn from(err: PriceError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<QuantityError> for ServiceError {
    fn from(err: QuantityError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ParseOrderStatusError> for ServiceError {
    fn from(err: ParseOrderStatusError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<WorkValidationError> for ServiceError {
    fn from(err: WorkValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
