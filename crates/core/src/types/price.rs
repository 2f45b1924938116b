//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are fixed-point decimals with at most two fractional digits. Binary
//! floating point never touches an amount: text from forms, YAML imports and
//! legacy rows is parsed straight into a [`Decimal`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of fractional digits a price may carry.
pub const MAX_SCALE: u32 = 2;

/// Errors produced when a price fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price '{0}' is not a decimal number")]
    Malformed(String),
    #[error("price {0} is negative")]
    Negative(Decimal),
    #[error("price {0} has more than {MAX_SCALE} decimal places")]
    TooPrecise(Decimal),
    #[error("price {0} exceeds the maximum of {max}", max = Price::MAX)]
    TooLarge(Decimal),
}

/// A non-negative amount in the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest unit price, 9 999 999 999.99. Stored as `NUMERIC(12, 2)`.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MAX_SCALE));

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero,
    /// `PriceError::TooPrecise` for amounts with sub-cent digits and
    /// `PriceError::TooLarge` above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Wrap an amount without validation, for arithmetic edge cases in tests.
    #[cfg(test)]
    pub(crate) const fn unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents` is below zero and
    /// `PriceError::TooLarge` above [`Price::MAX`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, MAX_SCALE))
    }

    /// Parse a price from user or legacy text such as `"250.00"` or `"99,50"`.
    ///
    /// Surrounding whitespace is ignored and a decimal comma is accepted.
    ///
    /// # Errors
    ///
    /// Returns a `PriceError` if the text is empty, not a number, negative,
    /// above [`Price::MAX`] or carries more than two fractional digits.
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let normalized = trimmed.replace(',', ".");
        let amount = Decimal::from_str_exact(&normalized)
            .map_err(|_| PriceError::Malformed(trimmed.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Add two prices, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiply by a whole number of units, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul_units(self, units: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(units)).map(Self)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
