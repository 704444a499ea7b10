//! Outbound integrations for storefront.
//!
//! # Services
//!
//! - `payments` - Hosted checkout hand-off (Stripe Checkout Sessions)
//! - `orders` - Order write after a completed checkout
//! - `newsletter` - Newsletter sign-up (Klaviyo or log-only)
//! - `klaviyo` - Klaviyo API client

pub mod klaviyo;
pub mod newsletter;
pub mod orders;
pub mod payments;

pub use klaviyo::{KlaviyoClient, KlaviyoError};
pub use newsletter::Newsletter;
pub use payments::{CheckoutSession, PaymentError, PaymentsClient};
