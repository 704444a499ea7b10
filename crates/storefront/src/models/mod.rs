//! Session-stored types for storefront.

use serde::{Deserialize, Serialize};

/// Session keys.
pub mod session_keys {
    /// Key naming the visitor's persisted cart.
    pub const CLIENT_KEY: &str = "cart_client_key";

    /// One-shot notice shown on the next page render.
    pub const FLASH: &str = "flash";

    /// Checkout session handed to the payment provider, awaiting return.
    pub const PENDING_CHECKOUT: &str = "pending_checkout";
}

/// A checkout that was sent to the hosted payment page.
///
/// Only a return to the success page carrying this session id can record an
/// order or empty the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub session_id: String,
    /// Email entered at checkout, used for the order write.
    pub email: String,
}

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A flash notice (the server-rendered analogue of a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }
}
