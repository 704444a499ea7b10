//! Klaviyo API client for newsletter sign-ups.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use shopfront_core::Email;
use thiserror::Error;
use tracing::instrument;

use crate::config::KlaviyoConfig;

/// Klaviyo API version.
const API_REVISION: &str = "2024-10-15";

/// Klaviyo API base URL.
const BASE_URL: &str = "https://a.klaviyo.com/api";

/// Source label attached to every subscription.
const CUSTOM_SOURCE: &str = "Shopfront Newsletter";

/// Errors that can occur when interacting with Klaviyo API.
#[derive(Debug, Error)]
pub enum KlaviyoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Klaviyo API client for subscription management.
#[derive(Clone)]
pub struct KlaviyoClient {
    client: reqwest::Client,
    list_id: String,
}

impl std::fmt::Debug for KlaviyoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoClient")
            .field("list_id", &self.list_id)
            .finish_non_exhaustive()
    }
}

impl KlaviyoClient {
    /// Create a new Klaviyo API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &KlaviyoConfig) -> Result<Self, KlaviyoError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Klaviyo-API-Key {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| KlaviyoError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("revision", HeaderValue::from_static(API_REVISION));
        headers.insert(
            "Content-Type",
            HeaderValue::from_static("application/vnd.api+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            list_id: config.list_id.clone(),
        })
    }

    fn subscription_body(&self, email: &Email) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "type": "profile-subscription-bulk-create-job",
                "attributes": {
                    "custom_source": CUSTOM_SOURCE,
                    "profiles": {
                        "data": [{
                            "type": "profile",
                            "attributes": {
                                "email": email.as_str(),
                                "subscriptions": {
                                    "email": {
                                        "marketing": {
                                            "consent": "SUBSCRIBED"
                                        }
                                    }
                                }
                            }
                        }]
                    }
                },
                "relationships": {
                    "list": {
                        "data": {
                            "type": "list",
                            "id": self.list_id
                        }
                    }
                }
            }
        })
    }

    /// Subscribe an email to the newsletter list.
    ///
    /// Creates or updates the profile and subscribes it to the configured
    /// list. Subscribing an address twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, email), fields(domain = email.domain()))]
    pub async fn subscribe_email(&self, email: &Email) -> Result<(), KlaviyoError> {
        let url = format!("{BASE_URL}/profile-subscription-bulk-create-jobs");

        let response = self
            .client
            .post(&url)
            .json(&self.subscription_body(email))
            .send()
            .await?;
        let status = response.status();

        // 202 Accepted is the expected response for bulk jobs
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(KlaviyoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
