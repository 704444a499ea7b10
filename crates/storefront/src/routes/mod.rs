//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?category=&sort=)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category grid
//!
//! # Cart (post/redirect/get with flash notices)
//! GET  /cart                   - Cart page with order summary
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Set line quantity
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Redirect to the hosted payment page
//! GET  /checkout/success       - Confirmation (paid: writes order, clears cart)
//!
//! # Marketing
//! POST /newsletter             - Newsletter sign-up
//! ```

pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod newsletter;
pub mod products;

use axum::{
    Router,
    body::Body,
    extract::FromRequestParts,
    http::{Request, request::Parts},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    Flash, OptionalCartClient, checkout_rate_limiter, create_session_layer,
    newsletter_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::models::Notice;
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Per-page data rendered by the base layout: the cart badge and any
/// pending flash notice.
pub struct PageChrome {
    pub cart_count: u64,
    pub notice: Option<Notice>,
}

impl FromRequestParts<AppState> for PageChrome {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalCartClient(client) =
            OptionalCartClient::from_request_parts(parts, state).await?;
        let Flash(notice) = Flash::from_request_parts(parts, state).await?;

        let cart_count = match client {
            Some(client) => state
                .with_cart(client, |cart| Ok(cart.total_items()))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to load cart for badge");
                    0
                }),
            None => 0,
        };

        Ok(Self { cart_count, notice })
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(checkout::start).layer(checkout_rate_limiter()),
        )
        .route("/success", get(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .nest("/products", product_routes())
        .route("/categories", get(categories::index))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route(
            "/newsletter",
            post(newsletter::subscribe).layer(newsletter_rate_limiter()),
        )
}

/// Build the complete application: routes, static assets, and the
/// middleware stack, bound to `state`.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// `target` if it is a same-site absolute path, otherwise `fallback`.
///
/// Keeps form-supplied return paths from redirecting off-site.
pub(crate) fn safe_return_path<'a>(target: Option<&'a str>, fallback: &'a str) -> &'a str {
    match target {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => fallback,
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/products/1"), "/"), "/products/1");
        assert_eq!(
            safe_return_path(Some("/products?category=Fashion"), "/"),
            "/products?category=Fashion"
        );
        assert_eq!(safe_return_path(Some("//evil.example"), "/"), "/");
        assert_eq!(safe_return_path(Some("https://evil.example"), "/"), "/");
        assert_eq!(safe_return_path(Some("/\\evil.example"), "/cart"), "/cart");
        assert_eq!(safe_return_path(None, "/products"), "/products");
    }
}
