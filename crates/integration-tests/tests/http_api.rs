//! Integration tests for the JSON API.
//!
//! Each request goes through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`.

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use atelier_integration_tests::{TestContext, price};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_owned()));

    let (status, _) = ctx.request(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_work_crud() {
    let ctx = TestContext::new();

    let (status, work) = ctx
        .request(
            Method::POST,
            "/works",
            Some(json!({ "title": "Blue vase", "price": "120,00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(price(&work["price"]), price(&json!("120.00")));
    assert_eq!(work["image"], "temp.jpg");
    let id = work["id"].as_i64().unwrap();

    let (status, fetched) = ctx.request(Method::GET, &format!("/works/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Blue vase");

    let (status, updated) = ctx
        .request(
            Method::PUT,
            &format!("/works/{id}"),
            Some(json!({ "title": "Blue vase", "price": "99.99" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(price(&updated["price"]), price(&json!("99.99")));

    let (status, listed) = ctx.request(Method::GET, "/works", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = ctx.request(Method::DELETE, &format!("/works/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx.request(Method::GET, &format!("/works/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_malformed_price_is_unprocessable() {
    let ctx = TestContext::new();

    for price in ["twelve", "-1", "10000000000.00"] {
        let (status, body) = ctx
            .request(
                Method::POST,
                "/works",
                Some(json!({ "title": "Vase", "price": price })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "price {price}");
        assert_eq!(body["error"], "validation");
    }

    let (_, listed) = ctx.request(Method::GET, "/works", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request(Method::POST, "/works", Some(json!({ "name": "missing fields" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_path_is_json_bad_request() {
    let ctx = TestContext::new();

    for uri in ["/works/vase", "/users/abc/cart", "/users/1/orders/first"] {
        let (status, body) = ctx.request(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "bad_request", "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_deleting_ordered_work_is_internal_error() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Print", "5.00").await;
    ctx.request(
        Method::POST,
        "/users/1/orders",
        Some(json!({ "items": [{ "work_id": work, "quantity": 1 }] })),
    )
    .await;

    let (status, body) = ctx
        .request(Method::DELETE, &format!("/works/{work}"), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_endpoints() {
    let ctx = TestContext::new();
    let vase = ctx.seed_work("Vase", "250.00").await;
    let bowl = ctx.seed_work("Bowl", "99.50").await;

    let (status, cart) = ctx.request(Method::GET, "/users/7/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["cart_id"], Value::Null);
    assert_eq!(price(&cart["total"]), price(&json!("0")));

    ctx.request(
        Method::POST,
        "/users/7/cart/items",
        Some(json!({ "work_id": vase, "quantity": 2 })),
    )
    .await;
    let (status, cart) = ctx
        .request(Method::POST, "/users/7/cart/items", Some(json!({ "work_id": bowl })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 3);
    assert_eq!(price(&cart["total"]), price(&json!("599.50")));

    let (status, cart) = ctx
        .request(
            Method::PUT,
            &format!("/users/7/cart/items/{vase}"),
            Some(json!({ "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(price(&cart["total"]), price(&json!("349.50")));

    let (status, cart) = ctx
        .request(Method::DELETE, &format!("/users/7/cart/items/{bowl}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (status, cart) = ctx
        .request(
            Method::PUT,
            &format!("/users/7/cart/items/{vase}"),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_quantities_are_unprocessable() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "1.00").await;

    for quantity in [0, -3] {
        let (status, body) = ctx
            .request(
                Method::POST,
                "/users/1/cart/items",
                Some(json!({ "work_id": work, "quantity": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "quantity {quantity}");
        assert_eq!(body["error"], "validation");
    }

    let (status, _) = ctx
        .request(
            Method::POST,
            "/users/1/cart/items",
            Some(json!({ "work_id": 404, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_endpoint() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "12.25").await;

    let (status, body) = ctx.request(Method::POST, "/users/3/cart/checkout", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    ctx.request(
        Method::POST,
        "/users/3/cart/items",
        Some(json!({ "work_id": work, "quantity": 4 })),
    )
    .await;
    let (status, order) = ctx.request(Method::POST, "/users/3/cart/checkout", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(price(&order["total"]), price(&json!("49.00")));

    let (_, cart) = ctx.request(Method::GET, "/users/3/cart", None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_endpoints() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Print", "10.00").await;

    let (status, body) = ctx
        .request(Method::POST, "/users/1/orders", Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, order) = ctx
        .request(
            Method::POST,
            "/users/1/orders",
            Some(json!({ "items": [
                { "work_id": work, "quantity": 1 },
                { "work_id": work, "quantity": 2 },
            ] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(price(&order["total"]), price(&json!("30.00")));
    let id = order["id"].as_i64().unwrap();

    let (status, shown) = ctx
        .request(Method::GET, &format!("/users/1/orders/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["id"], id);

    let (status, _) = ctx
        .request(Method::GET, &format!("/users/2/orders/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = ctx.request(Method::GET, "/users/1/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_endpoints() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Print", "10.00").await;
    let (_, order) = ctx
        .request(
            Method::POST,
            "/users/1/orders",
            Some(json!({ "items": [{ "work_id": work, "quantity": 1 }] })),
        )
        .await;
    let id = order["id"].as_i64().unwrap();
    let status_uri = format!("/users/1/orders/{id}/status");

    let (status, body) = ctx
        .request(Method::POST, &status_uri, Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
    assert_eq!(body["message"], "cannot move order from pending to shipped");

    let (status, body) = ctx
        .request(Method::POST, &status_uri, Some(json!({ "status": "lost" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, body) = ctx
        .request(Method::POST, &status_uri, Some(json!({ "status": "processing" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    let (status, _) = ctx
        .request(
            Method::POST,
            &format!("/users/2/orders/{id}/status"),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .request(Method::POST, &status_uri, Some(json!({ "status": "Deleted" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (status, history) = ctx
        .request(Method::GET, &format!("/users/1/orders/{id}/history"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let steps: Vec<(&str, &str)> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|change| {
            (
                change["from_status"].as_str().unwrap(),
                change["to_status"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        steps,
        vec![("pending", "processing"), ("processing", "deleted")]
    );

    let (_, listed) = ctx.request(Method::GET, "/users/1/orders", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = TestContext::new();
    let response = {
        use tower::ServiceExt;
        ctx.app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .header("x-request-id", "trace-abc")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    };
    assert_eq!(response.headers()["x-request-id"], "trace-abc");
}
