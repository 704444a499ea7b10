//! Storefront flows against the hosted backend and payment provider,
//! served by a local mock.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use shopfront_core::{CartLine, Email, ProductId};
use shopfront_integration_tests::TestApp;
use shopfront_integration_tests::mock::{
    CHECKOUT_SESSION_ID, CHECKOUT_URL, CatalogBehavior, CheckoutBehavior, MockServices, ORDER_ID,
};
use shopfront_storefront::services::{PaymentError, PaymentsClient};

const SESSIONS: &str = "/v1/checkout/sessions";
const SUCCESS: &str = "/checkout/success?session_id=cs_test_a1b2c3";

async fn app_with_cart(mock: &MockServices) -> TestApp {
    let mut app = TestApp::with_config(mock.config());
    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "2"), ("quantity", "2")])
        .await;
    app
}

#[tokio::test]
async fn test_checkout_redirects_to_hosted_page() {
    let mock = MockServices::start().await;
    let mut app = app_with_cart(&mock).await;

    let response = app
        .post_form("/checkout", &[("email", "shopper@example.com")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(CHECKOUT_URL));

    let created = mock.requests_to(&Method::POST, SESSIONS);
    assert_eq!(created.len(), 1);
    let form = &created[0];
    assert_eq!(form.form_value("customer_email").as_deref(), Some("shopper@example.com"));
    assert_eq!(form.form_value("line_items[0][price_data][unit_amount]").as_deref(), Some("9999"));
    assert_eq!(form.form_value("line_items[1][price_data][unit_amount]").as_deref(), Some("29999"));
    assert_eq!(form.form_value("line_items[1][quantity]").as_deref(), Some("2"));

    // nothing is written until the return is confirmed
    assert!(mock.backend_writes().is_empty());
}

#[tokio::test]
async fn test_missing_redirect_keeps_cart() {
    let mock = MockServices::start().await;
    mock.set_checkout(CheckoutBehavior::MissingUrl);
    let mut app = app_with_cart(&mock).await;

    let response = app
        .post_form("/checkout", &[("email", "shopper@example.com")])
        .await;
    assert_eq!(response.location(), Some("/cart"));

    let page = app.get("/cart").await;
    assert!(page.body.contains("Checkout failed. Please try again."));
    assert!(page.body.contains("Wireless Bluetooth Headphones"));
    assert!(page.body.contains("$599.98"));
}

#[tokio::test]
async fn test_provider_error_keeps_cart() {
    let mock = MockServices::start().await;
    mock.set_checkout(CheckoutBehavior::Fail);
    let mut app = app_with_cart(&mock).await;

    let response = app
        .post_form("/checkout", &[("email", "shopper@example.com")])
        .await;
    assert_eq!(response.location(), Some("/cart"));
    assert_eq!(mock.requests_to(&Method::POST, SESSIONS).len(), 1);

    let page = app.get("/cart").await;
    assert!(page.body.contains("Checkout failed. Please try again."));
    assert!(page.body.contains("Smart Watch Series 8"));
}

#[tokio::test]
async fn test_payments_client_errors() {
    let mock = MockServices::start().await;
    let client = PaymentsClient::new(&mock.payments_config(), "https://shop.example.com").unwrap();
    let email = Email::parse("shopper@example.com").unwrap();
    let lines = [CartLine {
        id: ProductId::new("1"),
        name: "Wireless Bluetooth Headphones".to_string(),
        price: "99.99".parse().unwrap(),
        image: String::new(),
        quantity: 1,
    }];

    mock.set_checkout(CheckoutBehavior::MissingUrl);
    let err = client.create_checkout_session(&lines, &email).await.unwrap_err();
    assert!(matches!(err, PaymentError::MissingRedirect(id) if id == CHECKOUT_SESSION_ID));

    mock.set_checkout(CheckoutBehavior::Fail);
    let err = client.create_checkout_session(&lines, &email).await.unwrap_err();
    assert!(matches!(err, PaymentError::Api { status: 402, .. }));

    mock.set_checkout(CheckoutBehavior::Redirect);
    let session = client.create_checkout_session(&lines, &email).await.unwrap();
    assert_eq!(session.id, CHECKOUT_SESSION_ID);
    assert_eq!(session.url, CHECKOUT_URL);

    assert!(client.is_paid(CHECKOUT_SESSION_ID).await.unwrap());
    mock.set_payment_status("unpaid");
    assert!(!client.is_paid(CHECKOUT_SESSION_ID).await.unwrap());
}

#[tokio::test]
async fn test_hosted_catalog_serves_products() {
    let mock = MockServices::start().await;
    let mut app = TestApp::with_config(mock.config());

    let page = app.get("/products?category=Electronics").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Smart Watch Series 8"));
    assert!(!page.body.contains("Premium Coffee Maker"));

    let listing = &mock.requests_to(&Method::GET, "/rest/v1/products")[0];
    assert!(listing.query.contains("category=eq.Electronics"));
}

#[tokio::test]
async fn test_hosted_catalog_failure_degrades() {
    let mock = MockServices::start().await;
    mock.set_catalog(CatalogBehavior::Fail);
    let mut app = TestApp::with_config(mock.config());

    let page = app.get("/products").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(!page.body.contains("Wireless Bluetooth Headphones"));

    let page = app.get("/products/1").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);

    let response = app.post_form("/cart/add", &[("id", "1")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let page = app.get("/cart").await;
    assert!(page.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_paid_checkout_records_order_then_items() {
    let mock = MockServices::start().await;
    let mut app = app_with_cart(&mock).await;
    app.post_form("/checkout", &[("email", "shopper@example.com")])
        .await;

    let page = app.get(SUCCESS).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Thank you for your order!"));
    assert!(page.body.contains(&format!("Order reference: {ORDER_ID}")));

    let lookups = mock.requests_to(&Method::GET, &format!("{SESSIONS}/{CHECKOUT_SESSION_ID}"));
    assert_eq!(lookups.len(), 1);

    let writes = mock.backend_writes();
    let paths: Vec<&str> = writes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["/rest/v1/orders", "/rest/v1/order_items"]);

    let order = writes[0].json();
    assert_eq!(order[0]["total_amount"], "699.97");
    assert_eq!(order[0]["status"], "pending");
    assert_eq!(order[0]["customer_email"], "shopper@example.com");
    assert_eq!(order[0]["payment_session_id"], CHECKOUT_SESSION_ID);

    let items = writes[1].json();
    assert_eq!(items.as_array().unwrap().len(), 2);
    assert_eq!(items[0]["order_id"], ORDER_ID);
    assert_eq!(items[1]["product_id"], "2");
    assert_eq!(items[1]["quantity"], 2);
    assert_eq!(items[1]["price"], "299.99");

    let page = app.get("/cart").await;
    assert!(page.body.contains("Your cart is empty"));

    // a second visit to the same URL writes nothing more
    app.get(SUCCESS).await;
    assert_eq!(mock.backend_writes().len(), 2);
}

#[tokio::test]
async fn test_success_without_started_checkout_writes_nothing() {
    let mock = MockServices::start().await;
    let mut app = app_with_cart(&mock).await;

    let page = app.get(SUCCESS).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("We could not confirm your payment"));
    assert!(!page.body.contains("Thank you for your order!"));

    assert!(mock.backend_writes().is_empty());
    assert!(mock.requests_to(&Method::GET, &format!("{SESSIONS}/{CHECKOUT_SESSION_ID}")).is_empty());

    let page = app.get("/cart").await;
    assert!(page.body.contains("Wireless Bluetooth Headphones"));
}

#[tokio::test]
async fn test_success_with_other_session_id_writes_nothing() {
    let mock = MockServices::start().await;
    let mut app = app_with_cart(&mock).await;
    app.post_form("/checkout", &[("email", "shopper@example.com")])
        .await;

    let page = app.get("/checkout/success?session_id=cs_test_forged").await;
    assert!(page.body.contains("We could not confirm your payment"));
    assert!(mock.backend_writes().is_empty());

    let page = app.get("/cart").await;
    assert!(page.body.contains("Smart Watch Series 8"));
}

#[tokio::test]
async fn test_unpaid_session_writes_nothing() {
    let mock = MockServices::start().await;
    mock.set_payment_status("unpaid");
    let mut app = app_with_cart(&mock).await;
    app.post_form("/checkout", &[("email", "shopper@example.com")])
        .await;

    let page = app.get(SUCCESS).await;
    assert!(page.body.contains("We could not confirm your payment"));
    assert!(mock.backend_writes().is_empty());

    let page = app.get("/cart").await;
    assert!(page.body.contains("Wireless Bluetooth Headphones"));

    // payment completes later; the same return now confirms
    mock.set_payment_status("paid");
    let page = app.get(SUCCESS).await;
    assert!(page.body.contains("Thank you for your order!"));
    assert_eq!(mock.backend_writes().len(), 2);
}
