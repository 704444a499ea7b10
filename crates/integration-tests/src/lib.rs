//! Integration test harness for Shopfront.
//!
//! Drives the full storefront router in-process with
//! `tower::ServiceExt::oneshot`, carrying the session cookie from one
//! request to the next the way a browser would.
//!
//! ```rust,ignore
//! let mut app = TestApp::new();
//! let response = app.post_form("/cart/add", &[("id", "1")]).await;
//! assert_eq!(response.location(), Some("/products"));
//! ```
//!
//! [`mock::MockServices`] stands in for the hosted backend and the payment
//! provider when a test needs them.

pub mod mock;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::routes;
use shopfront_storefront::state::AppState;
use tower::ServiceExt;

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The storefront app plus one browser's cookie jar.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// App with development defaults: built-in catalog, in-memory carts, no
    /// outbound integrations.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::default())
    }

    /// App built from `config`.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let state = AppState::new(config).expect("failed to build app state");
        Self {
            router: routes::app(state),
            cookie: None,
        }
    }

    /// Same app, fresh cookie jar (a second browser).
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Whether the app has set a session cookie for this visitor.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty());
        self.send(request).await
    }

    /// Send a form-encoded POST request.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body));
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, request: axum::http::Result<Request<Body>>) -> TestResponse {
        let request = request.expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
