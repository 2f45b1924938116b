//! Integration tests for cart management.
//!
//! These tests drive `CartService` against the in-memory store, including
//! concurrent adds from many tasks.

use atelier_core::{Price, UserId, WorkId};
use atelier_integration_tests::TestContext;
use atelier_shop::services::{CartService, CatalogService, ServiceError};

fn amount(text: &str) -> Price {
    Price::parse(text).unwrap()
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn test_cart_total_matches_worked_example() {
    let ctx = TestContext::new();
    let vase = ctx.seed_work("Vase", "250.00").await;
    let bowl = ctx.seed_work("Bowl", "99.50").await;
    let user = UserId::new(1);
    let cart = CartService::new(&ctx.store);

    cart.add_item(user, vase, 2).await.unwrap();
    cart.add_item(user, bowl, 1).await.unwrap();

    let view = cart.view(user).await.unwrap();
    assert_eq!(view.total, amount("599.50"));
    assert_eq!(view.item_count, 3);
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].line_total, amount("500.00"));
    assert_eq!(cart.total(user).await.unwrap(), amount("599.50"));
}

#[tokio::test]
async fn test_decimal_prices_sum_exactly() {
    let ctx = TestContext::new();
    let user = UserId::new(1);
    let cart = CartService::new(&ctx.store);

    // 0.10 + 0.20 would drift in binary floating point.
    let a = ctx.seed_work("A", "0.10").await;
    let b = ctx.seed_work("B", "0.20").await;
    cart.add_item(user, a, 1).await.unwrap();
    cart.add_item(user, b, 1).await.unwrap();

    assert_eq!(cart.total(user).await.unwrap(), amount("0.30"));
}

#[tokio::test]
async fn test_empty_cart_totals_zero() {
    let ctx = TestContext::new();
    let cart = CartService::new(&ctx.store);
    let user = UserId::new(5);

    cart.get_or_create_cart(user).await.unwrap();
    let view = cart.view(user).await.unwrap();
    assert!(view.is_empty());
    assert!(view.cart_id.is_some());
    assert_eq!(view.total, Price::ZERO);
}

// =============================================================================
// Line management
// =============================================================================

#[tokio::test]
async fn test_adding_same_work_twice_keeps_one_line() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "10.00").await;
    let user = UserId::new(1);
    let cart = CartService::new(&ctx.store);

    let first = cart.add_item(user, work, 1).await.unwrap();
    let second = cart.add_item(user, work, 2).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity.get(), 3);
}

#[tokio::test]
async fn test_invalid_add_leaves_cart_unchanged() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "10.00").await;
    let user = UserId::new(1);
    let cart = CartService::new(&ctx.store);
    cart.add_item(user, work, 2).await.unwrap();
    let before = cart.view(user).await.unwrap();

    assert!(matches!(
        cart.add_item(user, work, 0).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        cart.add_item(user, WorkId::new(404), 1).await,
        Err(ServiceError::NotFound(_))
    ));

    assert_eq!(cart.view(user).await.unwrap(), before);
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "10.00").await;
    let cart = CartService::new(&ctx.store);

    cart.add_item(UserId::new(1), work, 1).await.unwrap();

    assert!(cart.view(UserId::new(2)).await.unwrap().is_empty());
    assert!(matches!(
        cart.remove_item(UserId::new(2), work).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleting_work_drops_it_from_carts() {
    let ctx = TestContext::new();
    let kept = ctx.seed_work("Kept", "3.00").await;
    let dropped = ctx.seed_work("Dropped", "4.00").await;
    let user = UserId::new(1);
    let cart = CartService::new(&ctx.store);
    cart.add_item(user, kept, 1).await.unwrap();
    cart.add_item(user, dropped, 1).await.unwrap();

    CatalogService::new(&ctx.store)
        .delete_work(dropped)
        .await
        .unwrap();

    let view = cart.view(user).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total, amount("3.00"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_never_lose_increments() {
    let ctx = TestContext::new();
    let work = ctx.seed_work("Vase", "1.00").await;
    let user = UserId::new(1);

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let store = ctx.store.clone();
            tokio::spawn(async move { CartService::new(&store).add_item(user, work, 1).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let view = CartService::new(&ctx.store).view(user).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity.get(), 64);
    assert_eq!(view.total, amount("64.00"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_adds_create_one_cart() {
    let ctx = TestContext::new();
    let a = ctx.seed_work("A", "1.00").await;
    let b = ctx.seed_work("B", "2.00").await;
    let user = UserId::new(9);

    let (left, right) = tokio::join!(
        {
            let store = ctx.store.clone();
            async move { CartService::new(&store).add_item(user, a, 1).await }
        },
        {
            let store = ctx.store.clone();
            async move { CartService::new(&store).add_item(user, b, 1).await }
        },
    );

    assert_eq!(left.unwrap().cart_id, right.unwrap().cart_id);
    assert_eq!(
        CartService::new(&ctx.store).total(user).await.unwrap(),
        amount("3.00")
    );
}
