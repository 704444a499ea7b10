//! Catalog pages, newsletter, and the middleware stack.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use shopfront_integration_tests::TestApp;

#[tokio::test]
async fn test_home_page() {
    let mut app = TestApp::new();
    let page = app.get("/").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Amazing Products"));
    assert!(page.body.contains("Shop by Category"));
    assert!(page.body.contains("Stay Updated"));
    // First four products are featured
    assert!(page.body.contains("Ergonomic Office Chair"));
    assert!(!page.body.contains("Leather Backpack"));
}

#[tokio::test]
async fn test_listing_filters_by_category() {
    let mut app = TestApp::new();
    let page = app.get("/products?category=Home+%26+Garden").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Premium Coffee Maker"));
    assert!(page.body.contains("Ergonomic Office Chair"));
    assert!(!page.body.contains("Running Shoes"));
}

#[tokio::test]
async fn test_listing_empty_category() {
    let mut app = TestApp::new();
    let page = app.get("/products?category=Books").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No products found in this category."));
}

#[tokio::test]
async fn test_listing_sorts_by_price() {
    let mut app = TestApp::new();
    let page = app.get("/products?sort=price-asc").await;

    let backpack = page.body.find("Leather Backpack").unwrap();
    let watch = page.body.find("Smart Watch Series 8").unwrap();
    assert!(backpack < watch);

    let page = app.get("/products?sort=price-desc").await;
    let backpack = page.body.find("Leather Backpack").unwrap();
    let watch = page.body.find("Smart Watch Series 8").unwrap();
    assert!(watch < backpack);
}

#[tokio::test]
async fn test_product_detail() {
    let mut app = TestApp::new();
    let page = app.get("/products/1").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Wireless Bluetooth Headphones"));
    assert!(page.body.contains("Save $50.00"));
    assert!(page.body.contains("15 in stock"));
    assert!(page.body.contains("128 reviews"));
    assert!(page.body.contains("Active Noise Cancellation"));
}

#[tokio::test]
async fn test_product_not_found() {
    let mut app = TestApp::new();
    let page = app.get("/products/999").await;

    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Product not found"));
}

#[tokio::test]
async fn test_categories_page() {
    let mut app = TestApp::new();
    let page = app.get("/categories").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Beauty"));
    assert!(page.body.contains("/products?category=Home+%26+Garden"));
}

#[tokio::test]
async fn test_newsletter_subscribe() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/newsletter", &[("email", "Reader@Example.com")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let page = app.get("/").await;
    assert!(page.body.contains("Successfully subscribed to newsletter!"));
}

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let mut app = TestApp::new();

    app.post_form("/newsletter", &[("email", "nope")]).await;

    let page = app.get("/").await;
    assert!(page.body.contains("Please enter a valid email address."));
}

#[tokio::test]
async fn test_newsletter_is_rate_limited() {
    let mut app = TestApp::new();

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let response = app
            .post_form("/newsletter", &[("email", "reader@example.com")])
            .await;
        statuses.push(response.status);
    }

    assert_eq!(statuses[0], StatusCode::SEE_OTHER);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.headers.contains_key("x-request-id"));
}
