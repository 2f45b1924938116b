//! Cart management.
//!
//! Every user has at most one cart. It is created lazily on the first add, so
//! reading the cart of a user who never shopped yields an empty view without
//! writing anything.

use tracing::instrument;

use atelier_core::{Price, Quantity, UserId, WorkId, aggregate_total};

use super::ServiceError;
use crate::db::{CartRepository, CatalogRepository};
use crate::models::{Cart, CartItem, CartView, PricedLines};

/// Cart operations for a single storage backend.
#[derive(Debug)]
pub struct CartService<'a, R> {
    repo: &'a R,
}

impl<'a, R> CartService<'a, R>
where
    R: CartRepository + CatalogRepository,
{
    /// Create a new cart service.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Return the user's cart, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart, ServiceError> {
        Ok(self.repo.get_or_create_cart(user_id).await?)
    }

    /// Add `quantity` units of a work, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `quantity` is zero or too large,
    /// `ServiceError::NotFound` if the work does not exist and
    /// `ServiceError::Integrity` if the merged quantity would overflow.
    #[instrument(skip(self), fields(user_id = %user_id, work_id = %work_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        work_id: WorkId,
        quantity: u32,
    ) -> Result<CartItem, ServiceError> {
        let quantity = Quantity::new(quantity)?;

        if self.repo.get_work(work_id).await?.is_none() {
            return Err(ServiceError::not_found(format_args!("work {work_id}")));
        }

        let cart = self.repo.get_or_create_cart(user_id).await?;
        let item = match self.repo.add_item(cart.id, work_id, quantity).await {
            Ok(item) => item,
            // Deleted between the check and the insert.
            Err(crate::db::RepositoryError::NotFound) => {
                return Err(ServiceError::not_found(format_args!("work {work_id}")));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(cart_id = %cart.id, quantity = %item.quantity, "cart line updated");
        Ok(item)
    }

    /// Overwrite the quantity of a line; zero removes it.
    ///
    /// Returns the updated line, or `None` when the line was removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such line and
    /// `ServiceError::Validation` if `quantity` is too large.
    #[instrument(skip(self), fields(user_id = %user_id, work_id = %work_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        work_id: WorkId,
        quantity: u32,
    ) -> Result<Option<CartItem>, ServiceError> {
        if quantity == 0 {
            self.remove_item(user_id, work_id).await?;
            return Ok(None);
        }
        let quantity = Quantity::new(quantity)?;

        let cart = self.existing_cart(user_id, work_id).await?;
        self.repo
            .set_quantity(cart.id, work_id, quantity)
            .await?
            .map(Some)
            .ok_or_else(|| line_not_found(work_id))
    }

    /// Remove a work from the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user has no such line.
    #[instrument(skip(self), fields(user_id = %user_id, work_id = %work_id))]
    pub async fn remove_item(&self, user_id: UserId, work_id: WorkId) -> Result<(), ServiceError> {
        let cart = self.existing_cart(user_id, work_id).await?;
        if self.repo.remove_item(cart.id, work_id).await? {
            Ok(())
        } else {
            Err(line_not_found(work_id))
        }
    }

    /// Total of the cart at current work prices. Zero for an absent cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Integrity` if the total overflows.
    pub async fn total(&self, user_id: UserId) -> Result<Price, ServiceError> {
        let Some(cart) = self.repo.find_cart(user_id).await? else {
            return Ok(Price::ZERO);
        };
        let lines = self.repo.cart_lines(cart.id).await?;
        Ok(aggregate_total(&lines)?)
    }

    /// Cart contents with line totals and the cart total.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Integrity` if a total overflows.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn view(&self, user_id: UserId) -> Result<CartView, ServiceError> {
        let Some(cart) = self.repo.find_cart(user_id).await? else {
            return Ok(CartView::empty(user_id));
        };
        let lines = self.repo.cart_lines(cart.id).await?;
        let priced = PricedLines::from_lines(&lines)?;

        Ok(CartView {
            cart_id: Some(cart.id),
            user_id,
            items: priced.items,
            item_count: priced.item_count,
            total: priced.total,
        })
    }

    async fn existing_cart(&self, user_id: UserId, work_id: WorkId) -> Result<Cart, ServiceError> {
        self.repo
            .find_cart(user_id)
            .await?
            .ok_or_else(|| line_not_found(work_id))
    }
}

fn line_not_found(work_id: WorkId) -> ServiceError {
    ServiceError::not_found(format_args!("cart line for work {work_id}"))
}
