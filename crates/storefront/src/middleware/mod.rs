//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction tracing)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, framing, isolation)
//! 5. Session layer (tower-sessions with `MemoryStore`)
//! 6. Rate limiting on checkout and newsletter routes (governor)

pub mod cart_client;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use cart_client::{CartClient, Flash, OptionalCartClient, set_flash};
pub use rate_limit::{checkout_rate_limiter, newsletter_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
