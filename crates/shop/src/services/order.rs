//! Order placement, queries and the status lifecycle.

use tracing::instrument;

use atelier_core::{OrderId, OrderStatus, Price, Quantity, UserId, WorkId, aggregate_total};

use super::ServiceError;
use crate::db::{CartRepository, CatalogRepository, OrderRepository, RepositoryError};
use crate::models::{Order, OrderView, PricedLines, StatusChange};

/// Order operations for a single storage backend.
#[derive(Debug)]
pub struct OrderService<'a, R> {
    repo: &'a R,
}

impl<'a, R> OrderService<'a, R>
where
    R: OrderRepository + CartRepository + CatalogRepository,
{
    /// Create a new order service.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Place a `pending` order for explicit `(work, quantity)` entries.
    ///
    /// Entries naming the same work are merged into one line. Each line is
    /// priced at the work's current price.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `items` is empty or a quantity is
    /// out of range, and `ServiceError::NotFound` if a work does not exist. No
    /// order is stored on error.
    #[instrument(skip(self, items), fields(user_id = %user_id, entries = items.len()))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        items: &[(WorkId, u32)],
    ) -> Result<Order, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::Validation(
                "an order needs at least one item".to_owned(),
            ));
        }
        let lines = merge_entries(items)?;

        for (work_id, _) in &lines {
            if self.repo.get_work(*work_id).await?.is_none() {
                return Err(ServiceError::not_found(format_args!("work {work_id}")));
            }
        }

        let order = match self.repo.create_order(user_id, &lines).await {
            Ok(order) => order,
            Err(RepositoryError::NotFound) => {
                return Err(ServiceError::not_found("work"));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(order_id = %order.id, lines = lines.len(), "order placed");
        Ok(order)
    }

    /// Turn the user's cart into a `pending` order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the cart is empty or absent.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Order, ServiceError> {
        let Some(cart) = self.repo.find_cart(user_id).await? else {
            return Err(empty_cart());
        };
        let order = self
            .repo
            .checkout_cart(user_id, cart.id)
            .await?
            .ok_or_else(empty_cart)?;

        tracing::info!(order_id = %order.id, cart_id = %cart.id, "cart checked out");
        Ok(order)
    }

    /// Fetch an order owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist or belongs
    /// to another user.
    pub async fn get_order(&self, user_id: UserId, order_id: OrderId) -> Result<Order, ServiceError> {
        self.repo
            .get_order(order_id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(|| order_not_found(order_id))
    }

    /// The user's orders, newest first; soft-deleted orders are left out.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repo.list_orders(user_id).await?)
    }

    /// An order with its lines and total.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` as for [`Self::get_order`] and
    /// `ServiceError::Integrity` if the total overflows.
    pub async fn order_view(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderView, ServiceError> {
        let order = self.get_order(user_id, order_id).await?;
        let lines = self.repo.order_lines(order.id).await?;
        let priced = PricedLines::from_lines(&lines)?;

        Ok(OrderView {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            created_at: order.created_at,
            items: priced.items,
            total: priced.total,
        })
    }

    /// Total of an order at the prices recorded when it was placed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist and
    /// `ServiceError::Integrity` if the total overflows.
    pub async fn compute_total(&self, order_id: OrderId) -> Result<Price, ServiceError> {
        if self.repo.get_order(order_id).await?.is_none() {
            return Err(order_not_found(order_id));
        }
        let lines = self.repo.order_lines(order_id).await?;
        Ok(aggregate_total(&lines)?)
    }

    /// Move an order to `next` and record the change.
    ///
    /// The write only applies if the status is still the one that was
    /// validated. If another writer got there first the move is re-validated
    /// against the new status once before giving up.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidTransition` if the lifecycle has no edge
    /// from the current status to `next`, `ServiceError::NotFound` if the
    /// order does not exist, and `ServiceError::Integrity` if the status keeps
    /// changing underneath.
    #[instrument(skip(self), fields(order_id = %order_id, to = %next))]
    pub async fn transition_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, ServiceError> {
        for _ in 0..2 {
            let mut order = self
                .repo
                .get_order(order_id)
                .await?
                .ok_or_else(|| order_not_found(order_id))?;
            let current = order.status;
            current.transition_to(next)?;

            if self.repo.update_status(order_id, current, next).await? {
                tracing::info!(from = %current, "order status changed");
                order.status = next;
                return Ok(order);
            }
            tracing::debug!(from = %current, "status changed concurrently, re-reading");
        }

        tracing::warn!("gave up on status change after concurrent updates");
        Err(ServiceError::Integrity(format!(
            "status of order {order_id} changed concurrently"
        )))
    }

    /// Recorded status changes of an order owned by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` as for [`Self::get_order`].
    pub async fn status_history(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Vec<StatusChange>, ServiceError> {
        let order = self.get_order(user_id, order_id).await?;
        Ok(self.repo.status_history(order.id).await?)
    }
}

/// Validate quantities and collapse repeated works, keeping first-seen order.
fn merge_entries(items: &[(WorkId, u32)]) -> Result<Vec<(WorkId, Quantity)>, ServiceError> {
    let mut lines: Vec<(WorkId, Quantity)> = Vec::with_capacity(items.len());
    for &(work_id, quantity) in items {
        let quantity = Quantity::new(quantity)?;
        match lines.iter_mut().find(|(id, _)| *id == work_id) {
            Some((_, existing)) => {
                *existing = existing.checked_add(quantity).ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "quantity of work {work_id} exceeds the maximum of {}",
                        Quantity::MAX
                    ))
                })?;
            }
            None => lines.push((work_id, quantity)),
        }
    }
    Ok(lines)
}

fn empty_cart() -> ServiceError {
    ServiceError::Validation("cannot check out an empty cart".to_owned())
}

fn order_not_found(order_id: OrderId) -> ServiceError {
    ServiceError::not_found(format_args!("order {order_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewWork;
    use crate::services::CartService;

    async fn add_work(store: &MemoryStore, price: &str) -> WorkId {
        store
            .create_work(&NewWork {
                title: format!("Print at {price}"),
                description: String::new(),
                price: Price::parse(price).unwrap(),
                image: "temp.jpg".to_owned(),
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_merge_entries() {
        let a = WorkId::new(1);
        let b = WorkId::new(2);
        let merged = merge_entries(&[(a, 1), (b, 2), (a, 3)]).unwrap();
        assert_eq!(
            merged,
            vec![(a, Quantity::new(4).unwrap()), (b, Quantity::new(2).unwrap())]
        );
        assert!(matches!(
            merge_entries(&[(a, 0)]),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            merge_entries(&[(a, Quantity::MAX), (a, 1)]),
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store);

        let err = orders.create_order(UserId::new(1), &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(orders.list_orders(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_and_total() {
        let store = MemoryStore::new();
        let a = add_work(&store, "250.00").await;
        let b = add_work(&store, "99.50").await;
        let orders = OrderService::new(&store);

        let order = orders
            .create_order(UserId::new(1), &[(a, 2), (b, 1)])
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            orders.compute_total(order.id).await.unwrap(),
            Price::parse("599.50").unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_order_missing_work() {
        let store = MemoryStore::new();
        let a = add_work(&store, "1").await;
        let orders = OrderService::new(&store);

        let err = orders
            .create_order(UserId::new(1), &[(a, 1), (WorkId::new(77), 1)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "work 77 not found");
        assert!(orders.list_orders(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store);
        let user = UserId::new(1);

        assert!(matches!(
            orders.checkout(user).await,
            Err(ServiceError::Validation(_))
        ));
        CartService::new(&store).get_or_create_cart(user).await.unwrap();
        assert!(matches!(
            orders.checkout(user).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(orders.list_orders(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_moves_cart_into_order() {
        let store = MemoryStore::new();
        let work = add_work(&store, "20.00").await;
        let user = UserId::new(1);
        let cart = CartService::new(&store);
        cart.add_item(user, work, 3).await.unwrap();

        let orders = OrderService::new(&store);
        let order = orders.checkout(user).await.unwrap();

        let view = orders.order_view(user, order.id).await.unwrap();
        assert_eq!(view.total, Price::parse("60.00").unwrap());
        assert!(cart.view(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orders_of_other_users_are_hidden() {
        let store = MemoryStore::new();
        let work = add_work(&store, "1").await;
        let orders = OrderService::new(&store);
        let order = orders
            .create_order(UserId::new(1), &[(work, 1)])
            .await
            .unwrap();

        assert!(matches!(
            orders.get_order(UserId::new(2), order.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            orders.status_history(UserId::new(2), order.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transitions_follow_lifecycle() {
        let store = MemoryStore::new();
        let work = add_work(&store, "1").await;
        let orders = OrderService::new(&store);
        let user = UserId::new(1);
        let order = orders.create_order(user, &[(work, 1)]).await.unwrap();

        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = orders.transition_status(order.id, next).await.unwrap();
            assert_eq!(updated.status, next);
        }

        let err = orders
            .transition_status(order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
        assert_eq!(
            orders.get_order(user, order.id).await.unwrap().status,
            OrderStatus::Delivered
        );

        let history = orders.status_history(user, order.id).await.unwrap();
        let steps: Vec<_> = history.iter().map(|c| (c.from_status, c.to_status)).collect();
        assert_eq!(
            steps,
            vec![
                (OrderStatus::Pending, OrderStatus::Processing),
                (OrderStatus::Processing, OrderStatus::Shipped),
                (OrderStatus::Shipped, OrderStatus::Delivered),
            ]
        );
    }

    #[tokio::test]
    async fn test_soft_deleted_orders_leave_listing() {
        let store = MemoryStore::new();
        let work = add_work(&store, "1").await;
        let orders = OrderService::new(&store);
        let user = UserId::new(1);
        let kept = orders.create_order(user, &[(work, 1)]).await.unwrap();
        let dropped = orders.create_order(user, &[(work, 1)]).await.unwrap();

        orders
            .transition_status(dropped.id, OrderStatus::Deleted)
            .await
            .unwrap();

        let listed: Vec<_> = orders
            .list_orders(user)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(listed, vec![kept.id]);
        assert!(matches!(
            orders.transition_status(dropped.id, OrderStatus::Pending).await,
            Err(ServiceError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_transition_missing_order() {
        let store = MemoryStore::new();
        let orders = OrderService::new(&store);

        let err = orders
            .transition_status(OrderId::new(8), OrderStatus::Processing)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "order 8 not found");
    }
}
