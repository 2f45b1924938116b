//! In-process implementation of the repository traits.
//!
//! All tables sit behind one `tokio::sync::Mutex`, so every repository call is
//! atomic and calls serialize against each other. Used by the test suites and
//! by tooling that does not need durable storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use atelier_core::{
    CartId, CartItemId, OrderId, OrderItemId, OrderStatus, Price, Quantity, UserId, WorkId,
};

use super::{CartRepository, CatalogRepository, OrderRepository, RepositoryError, Store};
use crate::models::{Cart, CartItem, Line, NewWork, Order, OrderItem, StatusChange, Work};

/// Repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    works: BTreeMap<WorkId, Work>,
    carts: BTreeMap<CartId, Cart>,
    cart_items: BTreeMap<CartItemId, CartItem>,
    orders: BTreeMap<OrderId, Order>,
    order_items: BTreeMap<OrderItemId, OrderItem>,
    status_changes: Vec<StatusChange>,
}

impl Tables {
    /// Identity values are shared across tables; only uniqueness matters.
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn cart_item_mut(&mut self, cart_id: CartId, work_id: WorkId) -> Option<&mut CartItem> {
        self.cart_items
            .values_mut()
            .find(|item| item.cart_id == cart_id && item.work_id == work_id)
    }

    fn work_title(&self, work_id: WorkId) -> Result<String, RepositoryError> {
        self.works
            .get(&work_id)
            .map(|work| work.title.clone())
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("line references missing work {work_id}"))
            })
    }

    fn unit_price(&self, work_id: WorkId) -> Result<Price, RepositoryError> {
        self.works.get(&work_id).map(|work| work.price).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("order line references missing work {work_id}"))
        })
    }

    fn insert_order(&mut self, user_id: UserId) -> Order {
        let order = Order {
            id: OrderId::new(self.next_id()),
            user_id,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders.insert(order.id, order.clone());
        order
    }

    fn insert_order_item(
        &mut self,
        order_id: OrderId,
        work_id: WorkId,
        quantity: Quantity,
        unit_price: Price,
    ) {
        let item = OrderItem {
            id: OrderItemId::new(self.next_id()),
            order_id,
            work_id,
            quantity,
            unit_price,
        };
        self.order_items.insert(item.id, item);
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

impl CatalogRepository for MemoryStore {
    async fn create_work(&self, work: &NewWork) -> Result<Work, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let created = Work {
            id: WorkId::new(tables.next_id()),
            title: work.title.clone(),
            description: work.description.clone(),
            price: work.price,
            image: work.image.clone(),
            posted_at: Utc::now(),
        };
        tables.works.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_works(&self, works: &[NewWork]) -> Result<Vec<Work>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let posted_at = Utc::now();
        let created: Vec<Work> = works
            .iter()
            .map(|work| Work {
                id: WorkId::new(tables.next_id()),
                title: work.title.clone(),
                description: work.description.clone(),
                price: work.price,
                image: work.image.clone(),
                posted_at,
            })
            .collect();
        for work in &created {
            tables.works.insert(work.id, work.clone());
        }
        Ok(created)
    }

    async fn get_work(&self, id: WorkId) -> Result<Option<Work>, RepositoryError> {
        Ok(self.tables.lock().await.works.get(&id).cloned())
    }

    async fn list_works(&self) -> Result<Vec<Work>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut works: Vec<Work> = tables.works.values().cloned().collect();
        works.sort_by_key(|work| (work.posted_at, work.id));
        Ok(works)
    }

    async fn update_work(&self, id: WorkId, work: &NewWork) -> Result<Work, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let existing = tables.works.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        existing.title.clone_from(&work.title);
        existing.description.clone_from(&work.description);
        existing.price = work.price;
        existing.image.clone_from(&work.image);
        Ok(existing.clone())
    }

    async fn delete_work(&self, id: WorkId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.works.contains_key(&id) {
            return Ok(false);
        }
        if tables.order_items.values().any(|item| item.work_id == id) {
            return Err(RepositoryError::Conflict(format!(
                "work {id} is referenced by placed orders"
            )));
        }
        tables.works.remove(&id);
        tables.cart_items.retain(|_, item| item.work_id != id);
        Ok(true)
    }
}

impl CartRepository for MemoryStore {
    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(cart) = tables.carts.values().find(|cart| cart.user_id == user_id) {
            return Ok(cart.clone());
        }
        let cart = Cart {
            id: CartId::new(tables.next_id()),
            user_id,
            created_at: Utc::now(),
        };
        tables.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn find_cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .carts
            .values()
            .find(|cart| cart.user_id == user_id)
            .cloned())
    }

    async fn add_item(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.carts.contains_key(&cart_id) || !tables.works.contains_key(&work_id) {
            return Err(RepositoryError::NotFound);
        }

        if let Some(item) = tables.cart_item_mut(cart_id, work_id) {
            item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "quantity of work {work_id} exceeds {}",
                    Quantity::MAX
                ))
            })?;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: CartItemId::new(tables.next_id()),
            cart_id,
            work_id,
            quantity,
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn set_quantity(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.cart_item_mut(cart_id, work_id).map(|item| {
            item.quantity = quantity;
            item.clone()
        }))
    }

    async fn remove_item(&self, cart_id: CartId, work_id: WorkId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|_, item| !(item.cart_id == cart_id && item.work_id == work_id));
        Ok(tables.cart_items.len() < before)
    }

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<Line>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| -> Result<Line, RepositoryError> {
                let work = tables.works.get(&item.work_id).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "cart item {} references missing work {}",
                        item.id, item.work_id
                    ))
                })?;
                Ok(Line {
                    work_id: item.work_id,
                    title: work.title.clone(),
                    quantity: item.quantity,
                    unit_price: work.price,
                })
            })
            .collect()
    }
}

impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        user_id: UserId,
        items: &[(WorkId, Quantity)],
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.lock().await;
        // Check everything before the first write so a failure leaves no order.
        if items.iter().any(|(work_id, _)| !tables.works.contains_key(work_id)) {
            return Err(RepositoryError::NotFound);
        }

        let priced = items
            .iter()
            .map(|&(work_id, quantity)| {
                tables
                    .unit_price(work_id)
                    .map(|price| (work_id, quantity, price))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = tables.insert_order(user_id);
        for (work_id, quantity, unit_price) in priced {
            tables.insert_order_item(order.id, work_id, quantity, unit_price);
        }
        Ok(order)
    }

    async fn checkout_cart(
        &self,
        user_id: UserId,
        cart_id: CartId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let owned = tables
            .carts
            .get(&cart_id)
            .is_some_and(|cart| cart.user_id == user_id);
        if !owned {
            return Ok(None);
        }

        // Price every line before the first write so a failure leaves the cart intact.
        let lines = tables
            .cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| {
                tables
                    .unit_price(item.work_id)
                    .map(|price| (item.id, item.work_id, item.quantity, price))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if lines.is_empty() {
            return Ok(None);
        }

        let order = tables.insert_order(user_id);
        for (item_id, work_id, quantity, unit_price) in lines {
            tables.insert_order_item(order.id, work_id, quantity, unit_price);
            tables.cart_items.remove(&item_id);
        }
        Ok(Some(order))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id && order.status != OrderStatus::Deleted)
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(orders)
    }

    async fn order_lines(&self, id: OrderId) -> Result<Vec<Line>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .order_items
            .values()
            .filter(|item| item.order_id == id)
            .map(|item| -> Result<Line, RepositoryError> {
                Ok(Line {
                    work_id: item.work_id,
                    title: tables.work_title(item.work_id)?,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(order) = tables.orders.get_mut(&id) else {
            return Ok(false);
        };
        if order.status != from {
            return Ok(false);
        }
        order.status = to;
        tables.status_changes.push(StatusChange {
            order_id: id,
            from_status: from,
            to_status: to,
            changed_at: Utc::now(),
        });
        Ok(true)
    }

    async fn status_history(&self, id: OrderId) -> Result<Vec<StatusChange>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .status_changes
            .iter()
            .filter(|change| change.order_id == id)
            .cloned()
            .collect())
    }
}
