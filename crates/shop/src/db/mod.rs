//! Storage for the shop.
//!
//! # Database: `atelier`
//!
//! ## Tables
//!
//! - `work` - Catalog items
//! - `cart` - One cart per user
//! - `cart_item` - Works in a cart, unique per (cart, work)
//! - `customer_order` - Placed orders and their status
//! - `order_item` - Works in an order with the unit price at placement
//! - `order_status_change` - Audit trail of status transitions
//!
//! # Repositories
//!
//! Services talk to storage through [`CatalogRepository`], [`CartRepository`]
//! and [`OrderRepository`]. [`PgStore`] implements them on `PostgreSQL`;
//! [`MemoryStore`] implements them in process for tests and local tooling.
//! Every method is a single atomic unit: implementations must never leave a
//! partial write behind.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/shop/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use atelier_core::{CartId, OrderId, OrderStatus, Quantity, UserId, WorkId};

use crate::models::{Cart, CartItem, Line, NewWork, Order, StatusChange, Work};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., deleting a work that orders reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Catalog storage.
pub trait CatalogRepository: Send + Sync {
    /// Insert a work; `posted_at` is set to now.
    fn create_work(
        &self,
        work: &NewWork,
    ) -> impl Future<Output = Result<Work, RepositoryError>> + Send;

    /// Insert several works; either all are stored or none are.
    fn create_works(
        &self,
        works: &[NewWork],
    ) -> impl Future<Output = Result<Vec<Work>, RepositoryError>> + Send;

    fn get_work(
        &self,
        id: WorkId,
    ) -> impl Future<Output = Result<Option<Work>, RepositoryError>> + Send;

    /// All works, oldest first.
    fn list_works(&self) -> impl Future<Output = Result<Vec<Work>, RepositoryError>> + Send;

    /// Replace a work's editable fields.
    ///
    /// Fails with `RepositoryError::NotFound` if the work does not exist.
    fn update_work(
        &self,
        id: WorkId,
        work: &NewWork,
    ) -> impl Future<Output = Result<Work, RepositoryError>> + Send;

    /// Delete a work and drop it from every cart.
    ///
    /// Returns `false` if no such work existed. Fails with
    /// `RepositoryError::Conflict` if an order references the work.
    fn delete_work(&self, id: WorkId)
    -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Cart storage.
pub trait CartRepository: Send + Sync {
    /// Return the user's cart, creating it if absent. Safe under concurrent calls.
    fn get_or_create_cart(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Cart, RepositoryError>> + Send;

    fn find_cart(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Cart>, RepositoryError>> + Send;

    /// Add `quantity` units of a work, incrementing an existing line atomically.
    ///
    /// Fails with `RepositoryError::NotFound` if the work does not exist.
    fn add_item(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartItem, RepositoryError>> + Send;

    /// Overwrite the quantity of an existing line; `None` if the line is absent.
    fn set_quantity(
        &self,
        cart_id: CartId,
        work_id: WorkId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<Option<CartItem>, RepositoryError>> + Send;

    /// Remove a line; `false` if it was absent.
    fn remove_item(
        &self,
        cart_id: CartId,
        work_id: WorkId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Cart lines priced at the works' current prices, in insertion order.
    fn cart_lines(
        &self,
        cart_id: CartId,
    ) -> impl Future<Output = Result<Vec<Line>, RepositoryError>> + Send;
}

/// Order storage.
pub trait OrderRepository: Send + Sync {
    /// Create a `pending` order with one line per entry, priced at the works'
    /// current prices. Entries must name distinct works.
    ///
    /// Fails with `RepositoryError::NotFound` (and writes nothing) if any work
    /// does not exist.
    fn create_order(
        &self,
        user_id: UserId,
        items: &[(WorkId, Quantity)],
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Convert the cart's contents into a `pending` order and empty the cart,
    /// atomically. Returns `None` (and writes nothing) if the cart is empty or
    /// not owned by `user_id`.
    fn checkout_cart(
        &self,
        user_id: UserId,
        cart_id: CartId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    fn get_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// The user's orders, newest first, excluding soft-deleted ones.
    fn list_orders(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Order lines priced at the recorded unit prices.
    fn order_lines(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Vec<Line>, RepositoryError>> + Send;

    /// Compare-and-set the status and record the change.
    ///
    /// Returns `false` without writing if the stored status is not `from`.
    fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Recorded status changes, oldest first.
    fn status_history(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Vec<StatusChange>, RepositoryError>> + Send;
}

/// A complete storage backend.
pub trait Store:
    CatalogRepository + CartRepository + OrderRepository + Clone + Send + Sync + 'static
{
    /// Check that the backend is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
