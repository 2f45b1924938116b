//! Domain models for the shop.
//!
//! These types represent validated domain objects separate from database row
//! types. Cart and order contents are both read as [`Line`]s: a work, its
//! title, a quantity and the unit price that applies to the line.

pub mod cart;
pub mod order;
pub mod work;

use serde::Serialize;

use atelier_core::{LineItem, Price, PricingError, Quantity, WorkId, aggregate_total};

pub use cart::{Cart, CartItem, CartView};
pub use order::{Order, OrderItem, OrderView, StatusChange};
pub use work::{NewWork, Work, WorkInput, WorkValidationError};

/// A priced line of a cart or order.
///
/// For carts the unit price is the work's current price; for orders it is the
/// price recorded when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub work_id: WorkId,
    pub title: String,
    pub quantity: Quantity,
    pub unit_price: Price,
}

impl LineItem for Line {
    fn quantity(&self) -> Quantity {
        self.quantity
    }

    fn unit_price(&self) -> Price {
        self.unit_price
    }
}

/// A line ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub work_id: WorkId,
    pub title: String,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Priced lines with their combined total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLines {
    pub items: Vec<LineView>,
    pub item_count: u64,
    pub total: Price,
}

impl PricedLines {
    /// Price every line and sum the result.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::Overflow` if a line or the total overflows.
    pub fn from_lines(lines: &[Line]) -> Result<Self, PricingError> {
        let total = aggregate_total(lines)?;
        let items = lines
            .iter()
            .map(|line| -> Result<LineView, PricingError> {
                Ok(LineView {
                    work_id: line.work_id,
                    title: line.title.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let item_count = lines.iter().map(|line| u64::from(line.quantity.get())).sum::<u64>();

        Ok(Self {
            items,
            item_count,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(work: i64, quantity: u32, price: &str) -> Line {
        Line {
            work_id: WorkId::new(work),
            title: format!("Work {work}"),
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Price::parse(price).unwrap(),
        }
    }

    #[test]
    fn test_priced_lines() {
        let priced =
            PricedLines::from_lines(&[line(1, 2, "250.00"), line(2, 1, "99.50")]).unwrap();
        assert_eq!(priced.total, Price::parse("599.50").unwrap());
        assert_eq!(priced.item_count, 3);
        assert_eq!(priced.items[0].line_total, Price::parse("500").unwrap());
        assert_eq!(priced.items[1].line_total, Price::parse("99.5").unwrap());
    }

    #[test]
    fn test_no_lines() {
        let priced = PricedLines::from_lines(&[]).unwrap();
        assert_eq!(priced.total, Price::ZERO);
        assert_eq!(priced.item_count, 0);
        assert!(priced.items.is_empty());
    }
}
