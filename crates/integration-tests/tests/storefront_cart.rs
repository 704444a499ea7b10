//! End-to-end cart flows through the storefront router.
//!
//! Uses the built-in catalog and in-memory cart storage unless a test says
//! otherwise; no outbound services are configured.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use shopfront_integration_tests::TestApp;

async fn cart_count(app: &mut TestApp) -> String {
    let response = app.get("/cart/count").await;
    assert_eq!(response.status, StatusCode::OK);
    response
        .body
        .split('>')
        .nth(1)
        .and_then(|rest| rest.split('<').next())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_empty_cart_for_new_visitor() {
    let mut app = TestApp::new();

    assert_eq!(cart_count(&mut app).await, "0");

    let response = app.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_then_view_cart() {
    let mut app = TestApp::new();

    let response = app.post_form("/cart/add", &[("id", "1")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/products"));
    assert!(app.has_session());

    let response = app
        .post_form(
            "/cart/add",
            &[("id", "2"), ("quantity", "2"), ("redirect_to", "/products/2")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/products/2"));

    assert_eq!(cart_count(&mut app).await, "3");

    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Added 2 item(s) to cart!"));
    assert!(page.body.contains("Wireless Bluetooth Headphones"));
    assert!(page.body.contains("Smart Watch Series 8"));
    assert!(page.body.contains("$599.98"));
    // 99.99 + 2 x 299.99, tax 8%
    assert!(page.body.contains("$699.97"));
    assert!(page.body.contains("$56.00"));
    assert!(page.body.contains("$755.97"));

    // Flash notices are shown once
    let page = app.get("/cart").await;
    assert!(!page.body.contains("Added 2 item(s) to cart!"));
}

#[tokio::test]
async fn test_single_add_notice() {
    let mut app = TestApp::new();

    app.post_form("/cart/add", &[("id", "5")]).await;

    let page = app.get("/products").await;
    assert!(page.body.contains("Added to cart!"));
}

#[tokio::test]
async fn test_repeated_adds_merge_into_one_line() {
    let mut app = TestApp::new();

    for _ in 0..3 {
        app.post_form("/cart/add", &[("id", "3")]).await;
    }

    assert_eq!(cart_count(&mut app).await, "3");
    let page = app.get("/cart").await;
    assert_eq!(page.body.matches("Premium Coffee Maker</a></h3>").count(), 1);
}

#[tokio::test]
async fn test_update_quantity() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "2")]).await;

    let response = app
        .post_form("/cart/update", &[("id", "1"), ("quantity", "5")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/cart"));
    assert_eq!(cart_count(&mut app).await, "6");

    app.post_form("/cart/update", &[("id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(cart_count(&mut app).await, "1");

    app.post_form("/cart/update", &[("id", "2"), ("quantity", "-3")])
        .await;
    assert_eq!(cart_count(&mut app).await, "0");
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "4")]).await;

    for _ in 0..2 {
        let response = app.post_form("/cart/remove", &[("id", "4")]).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
    }

    assert_eq!(cart_count(&mut app).await, "0");
    let page = app.get("/cart").await;
    assert!(page.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_clear_cart() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "6"), ("quantity", "4")])
        .await;

    let response = app.post_form("/cart/clear", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    assert_eq!(cart_count(&mut app).await, "0");
    let page = app.get("/cart").await;
    assert!(page.body.contains("Cart cleared."));
    assert!(page.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let mut app = TestApp::new();

    let response = app.post_form("/cart/add", &[("id", "999")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(cart_count(&mut app).await, "0");
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/cart/add", &[("id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_ignores_offsite_redirect() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/cart/add",
            &[("id", "1"), ("redirect_to", "https://evil.example/")],
        )
        .await;
    assert_eq!(response.location(), Some("/products"));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = TestApp::new();
    let mut bob = alice.new_visitor();

    alice.post_form("/cart/add", &[("id", "1")]).await;
    bob.post_form("/cart/add", &[("id", "2")]).await;
    bob.post_form("/cart/add", &[("id", "2")]).await;

    assert_eq!(cart_count(&mut alice).await, "1");
    assert_eq!(cart_count(&mut bob).await, "2");
}

#[tokio::test]
async fn test_badge_in_layout() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "1"), ("quantity", "2")])
        .await;

    let page = app.get("/").await;
    assert!(page.body.contains(r#"<span class="cart-count">2</span>"#));
}
