//! HTTP route handlers for the shop JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                     - Liveness
//! GET  /health/ready                               - Storage readiness
//!
//! # Catalog
//! GET    /works                                    - List works
//! POST   /works                                    - Create work
//! GET    /works/{work_id}                          - Work detail
//! PUT    /works/{work_id}                          - Update work
//! DELETE /works/{work_id}                          - Delete work
//!
//! # Cart
//! GET    /users/{user_id}/cart                     - Cart view
//! POST   /users/{user_id}/cart/items               - Add item
//! PUT    /users/{user_id}/cart/items/{work_id}     - Set quantity (0 removes)
//! DELETE /users/{user_id}/cart/items/{work_id}     - Remove item
//! POST   /users/{user_id}/cart/checkout            - Cart to order
//!
//! # Orders
//! GET    /users/{user_id}/orders                   - List orders
//! POST   /users/{user_id}/orders                   - Place order directly
//! GET    /users/{user_id}/orders/{order_id}        - Order view
//! POST   /users/{user_id}/orders/{order_id}/status - Change status
//! GET    /users/{user_id}/orders/{order_id}/history - Status history
//! ```

pub mod cart;
pub mod health;
pub mod orders;
pub mod works;

use std::time::Duration;

use axum::{
    Router,
    extract::FromRequestParts,
    routing::{get, post, put},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::db::Store;
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::services::ServiceError;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn work_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(works::index::<S>).post(works::create::<S>))
        .route(
            "/{work_id}",
            get(works::show::<S>)
                .put(works::update::<S>)
                .delete(works::destroy::<S>),
        )
}

/// Create the per-user cart and order routes router.
pub fn user_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/cart", get(cart::show::<S>))
        .route("/cart/items", post(cart::add::<S>))
        .route(
            "/cart/items/{work_id}",
            put(cart::update::<S>).delete(cart::remove::<S>),
        )
        .route("/cart/checkout", post(cart::checkout::<S>))
        .route("/orders", get(orders::index::<S>).post(orders::create::<S>))
        .route("/orders/{order_id}", get(orders::show::<S>))
        .route("/orders/{order_id}/status", post(orders::transition::<S>))
        .route("/orders/{order_id}/history", get(orders::history::<S>))
}

/// Create all routes for the shop.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness::<S>))
        .nest("/works", work_routes())
        .nest("/users/{user_id}", user_routes())
}

/// Build the complete application with its middleware stack.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Path parameters whose rejection is rendered as a JSON `bad_request` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// Convert a signed quantity from a request body to the service argument.
///
/// Negative input is a validation failure like zero, not a malformed body.
fn quantity_arg(value: i64) -> Result<u32, AppError> {
    u32::try_from(value).map_err(|_| {
        let err = if value < 0 {
            atelier_core::QuantityError::TooSmall(value)
        } else {
            atelier_core::QuantityError::TooLarge(value)
        };
        AppError::Service(ServiceError::from(err))
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use atelier_core::WorkId;

    #[tokio::test]
    async fn test_path_rejection_is_bad_request() {
        async fn handler(Path(id): Path<WorkId>) -> String {
            id.to_string()
        }
        let app = Router::new().route("/{id}", get(handler));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/seven").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains(r#""error":"bad_request""#));
    }

    #[test]
    fn test_quantity_arg() {
        assert_eq!(quantity_arg(3).unwrap(), 3);
        assert_eq!(quantity_arg(0).unwrap(), 0);
        assert!(matches!(
            quantity_arg(-1),
            Err(AppError::Service(ServiceError::Validation(_)))
        ));
        assert!(matches!(
            quantity_arg(i64::from(u32::MAX) + 1),
            Err(AppError::Service(ServiceError::Validation(_)))
        ));
    }
}
