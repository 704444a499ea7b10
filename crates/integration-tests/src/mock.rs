//! Local stand-in for the hosted backend and the payment provider.
//!
//! Serves the handful of endpoints the storefront calls on a loopback
//! listener and records every request it receives, so tests can assert on
//! exactly what was sent and in which order.
//!
//! ```rust,ignore
//! let mock = MockServices::start().await;
//! let mut app = TestApp::with_config(mock.config());
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use shopfront_core::{CurrencyCode, Product};
use shopfront_storefront::catalog::fixtures;
use shopfront_storefront::config::{BackendConfig, PaymentsConfig, StorefrontConfig};
use url::Url;

/// Id of every checkout session the mock creates.
pub const CHECKOUT_SESSION_ID: &str = "cs_test_a1b2c3";

/// Hosted page returned for a created session.
pub const CHECKOUT_URL: &str = "https://checkout.stripe.com/c/pay/cs_test_a1b2c3";

/// Id given to every inserted order row.
pub const ORDER_ID: &str = "ord_1";

const SESSIONS_PATH: &str = "/v1/checkout/sessions";

/// How `POST /v1/checkout/sessions` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutBehavior {
    /// 200 with a hosted page URL.
    #[default]
    Redirect,
    /// 200 with `"url": null`.
    MissingUrl,
    /// 402 card declined.
    Fail,
}

/// How `GET /rest/v1/products` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogBehavior {
    /// The built-in products, filtered like the hosted table.
    #[default]
    Serve,
    /// 500.
    Fail,
}

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl RecordedRequest {
    /// Body parsed as JSON, or `Null`.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    /// Value of a form-encoded body field.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

#[derive(Debug)]
struct Behavior {
    checkout: CheckoutBehavior,
    catalog: CatalogBehavior,
    payment_status: String,
}

#[derive(Debug)]
struct MockState {
    behavior: Mutex<Behavior>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Running mock services.
pub struct MockServices {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockServices {
    /// Bind a loopback listener and start serving.
    ///
    /// Sessions report `paid` until told otherwise.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            behavior: Mutex::new(Behavior {
                checkout: CheckoutBehavior::default(),
                catalog: CatalogBehavior::default(),
                payment_status: "paid".to_string(),
            }),
            requests: Mutex::default(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock listener");
        let addr = listener.local_addr().expect("mock listener has no address");

        let router = Router::new().fallback(handle).with_state(Arc::clone(&state));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Mock services stopped");
            }
        });

        Self { addr, state }
    }

    pub fn set_checkout(&self, checkout: CheckoutBehavior) {
        self.behavior().checkout = checkout;
    }

    pub fn set_catalog(&self, catalog: CatalogBehavior) {
        self.behavior().catalog = catalog;
    }

    /// `payment_status` reported for any session lookup.
    pub fn set_payment_status(&self, status: &str) {
        self.behavior().payment_status = status.to_string();
    }

    fn behavior(&self) -> std::sync::MutexGuard<'_, Behavior> {
        self.state
            .behavior
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `method` on `path`, oldest first.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    /// Requests that wrote to the hosted backend, oldest first.
    #[must_use]
    pub fn backend_writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.path.starts_with("/rest/v1/"))
            .collect()
    }

    #[allow(clippy::expect_used)]
    fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("loopback URL is valid")
    }

    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            url: self.url("/"),
            anon_key: SecretString::from("eyJhbGciOiJIUzI1NiJ9.anon"),
        }
    }

    #[must_use]
    pub fn payments_config(&self) -> PaymentsConfig {
        PaymentsConfig {
            secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            currency: CurrencyCode::USD,
            api_base: self.url("/v1"),
        }
    }

    /// Development config wired to this mock for both the catalog and
    /// checkout.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            backend: Some(self.backend_config()),
            payments: Some(self.payments_config()),
            ..StorefrontConfig::default()
        }
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let response = {
        let behavior = state
            .behavior
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        respond(&behavior, &request)
    };

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);
    response
}

fn respond(behavior: &Behavior, request: &RecordedRequest) -> Response {
    let path = request.path.as_str();

    if request.method == Method::GET
        && let Some(id) = path
            .strip_prefix(SESSIONS_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
    {
        return Json(json!({ "id": id, "payment_status": behavior.payment_status }))
            .into_response();
    }

    match (request.method.as_str(), path) {
        ("POST", SESSIONS_PATH) => match behavior.checkout {
            CheckoutBehavior::Redirect => {
                Json(json!({ "id": CHECKOUT_SESSION_ID, "url": CHECKOUT_URL })).into_response()
            }
            CheckoutBehavior::MissingUrl => {
                Json(json!({ "id": CHECKOUT_SESSION_ID, "url": null })).into_response()
            }
            CheckoutBehavior::Fail => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "error": { "message": "Your card was declined." } })),
            )
                .into_response(),
        },
        ("GET", "/rest/v1/products") => match behavior.catalog {
            CatalogBehavior::Serve => Json(products(&request.query)).into_response(),
            CatalogBehavior::Fail => {
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response()
            }
        },
        ("POST", "/rest/v1/orders") => {
            let mut row = request
                .json()
                .as_array()
                .and_then(|rows| rows.first())
                .cloned()
                .unwrap_or_else(|| json!({}));
            if let Some(fields) = row.as_object_mut() {
                fields.insert("id".to_string(), json!(ORDER_ID));
                fields.insert("created_at".to_string(), json!("2024-01-15T10:30:00Z"));
            }
            (StatusCode::CREATED, Json(json!([row]))).into_response()
        }
        ("POST", "/rest/v1/order_items") => StatusCode::CREATED.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Built-in products filtered by the `id=eq.X` and `category=eq.X` query
/// pairs the storefront sends.
fn products(query: &str) -> Vec<Product> {
    let mut products = fixtures::products();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some(wanted) = value.strip_prefix("eq.") else {
            continue;
        };
        match key.as_ref() {
            "id" => products.retain(|p| p.id.as_str() == wanted),
            "category" => products.retain(|p| p.category == wanted),
            _ => {}
        }
    }
    products
}
