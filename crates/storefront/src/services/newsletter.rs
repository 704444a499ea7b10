//! Newsletter sign-up.
//!
//! Subscribes through Klaviyo when it is configured. Without a provider the
//! sign-up is only logged, matching a storefront that has not wired up
//! email marketing yet.

use shopfront_core::Email;
use tracing::instrument;

use super::klaviyo::{KlaviyoClient, KlaviyoError};

/// Where newsletter sign-ups go.
#[derive(Debug, Clone)]
pub enum Newsletter {
    Klaviyo(KlaviyoClient),
    /// Log the sign-up and acknowledge it.
    LogOnly,
}

impl Newsletter {
    /// Subscribe `email`.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the subscription.
    #[instrument(skip(self, email), fields(domain = email.domain()))]
    pub async fn subscribe(&self, email: &Email) -> Result<(), KlaviyoError> {
        match self {
            Self::Klaviyo(client) => client.subscribe_email(email).await?,
            Self::LogOnly => {
                tracing::info!("Newsletter provider not configured, sign-up logged only");
            }
        }
        Ok(())
    }
}
