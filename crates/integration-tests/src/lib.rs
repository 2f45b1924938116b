//! Integration tests for Atelier.
//!
//! The suites in `tests/` drive the services and the HTTP router end to end
//! against [`MemoryStore`], so they need no database. `postgres_store` is the
//! exception and runs only with `--ignored` and a `DATABASE_URL`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart merging, totals and concurrent adds
//! - `order_lifecycle` - Order placement, checkout and status changes
//! - `http_api` - JSON API status codes and bodies
//! - `postgres_store` - `PgStore` atomicity against a live database (ignored by default)

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use atelier_core::{Price, WorkId};
use atelier_shop::db::{CatalogRepository, MemoryStore};
use atelier_shop::models::NewWork;
use atelier_shop::routes;
use atelier_shop::state::AppState;

/// A fresh in-memory shop.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    pub store: MemoryStore,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a work directly through the repository.
    ///
    /// # Panics
    ///
    /// Panics if `price` is not a valid price.
    pub async fn seed_work(&self, title: &str, price: &str) -> WorkId {
        let work = NewWork {
            title: title.to_owned(),
            description: String::new(),
            price: Price::parse(price).expect("valid seed price"),
            image: "temp.jpg".to_owned(),
        };
        self.store
            .create_work(&work)
            .await
            .expect("memory store accepts works")
            .id
    }

    /// The full application router over this context's store.
    #[must_use]
    pub fn app(&self) -> Router {
        routes::app(AppState::new(self.store.clone()))
    }

    /// Send one request through a fresh router and decode the JSON response.
    ///
    /// Empty bodies decode to `Value::Null`; non-JSON bodies to a string.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.app().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}

/// Parse a decimal string from a JSON response into a `Price`.
///
/// # Panics
///
/// Panics if `value` is not a string holding a valid price.
#[must_use]
pub fn price(value: &Value) -> Price {
    value
        .as_str()
        .and_then(|text| Price::parse(text).ok())
        .unwrap_or_else(|| panic!("expected a price string, got {value}"))
}
