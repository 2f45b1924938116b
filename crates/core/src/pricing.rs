//! Exact decimal pricing.
//!
//! `line_total = quantity × unit_price` and `aggregate_total = Σ line_total`.
//! Both are pure and report overflow instead of wrapping or saturating.

use thiserror::Error;

use crate::types::{Price, Quantity};

/// Errors from price arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// Anything that contributes `quantity × unit_price` to a total.
pub trait LineItem {
    /// Number of units on the line.
    fn quantity(&self) -> Quantity;

    /// Price of one unit.
    fn unit_price(&self) -> Price;

    /// Total for this line.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Overflow` if the product does not fit a decimal.
    fn line_total(&self) -> Result<Price, PricingError> {
        line_total(self.quantity(), self.unit_price())
    }
}

impl LineItem for (Quantity, Price) {
    fn quantity(&self) -> Quantity {
        self.0
    }

    fn unit_price(&self) -> Price {
        self.1
    }
}

/// Total for `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns `PricingError::Overflow` if the product does not fit a decimal.
pub fn line_total(quantity: Quantity, unit_price: Price) -> Result<Price, PricingError> {
    unit_price
        .checked_mul_units(quantity.get())
        .ok_or(PricingError::Overflow)
}

/// Sum of the line totals of `items`; zero for no items.
///
/// # Errors
///
/// Returns `PricingError::Overflow` if any line or the running sum overflows.
pub fn aggregate_total<'a, L, I>(items: I) -> Result<Price, PricingError>
where
    L: LineItem + 'a,
    I: IntoIterator<Item = &'a L>,
{
    items.into_iter().try_fold(Price::ZERO, |total, item| {
        total
            .checked_add(item.line_total()?)
            .ok_or(PricingError::Overflow)
    })
}
