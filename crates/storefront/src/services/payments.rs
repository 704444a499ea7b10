//! Hosted payment page hand-off (Stripe Checkout Sessions).
//!
//! One form-encoded `POST /v1/checkout/sessions` per checkout. The response
//! must carry the hosted page URL; anything else is a failure. There is no
//! retry and no idempotency key. A return to the success page is confirmed
//! with `GET /v1/checkout/sessions/{id}` before an order is recorded.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use shopfront_core::{CartLine, CurrencyCode, Email, Price};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::PaymentsConfig;

/// Placeholder Stripe substitutes with the created session id.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Session was created but the response had no redirect URL.
    #[error("checkout session {0} has no redirect URL")]
    MissingRedirect(String),

    /// Nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,

    /// A line price cannot be expressed in minor units.
    #[error("invalid amount for {0}")]
    InvalidAmount(String),

    /// Failed to parse response or build headers.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page to redirect the shopper to.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
}

/// Client for creating hosted checkout sessions.
#[derive(Clone)]
pub struct PaymentsClient {
    inner: Arc<PaymentsClientInner>,
}

struct PaymentsClientInner {
    client: reqwest::Client,
    api_base: Url,
    currency: CurrencyCode,
    success_url: String,
    cancel_url: String,
}

impl std::fmt::Debug for PaymentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("currency", &self.inner.currency)
            .field("success_url", &self.inner.success_url)
            .finish_non_exhaustive()
    }
}

impl PaymentsClient {
    /// Create a new payments client.
    ///
    /// `base_url` is the storefront's public URL; the success and cancel
    /// URLs are built from it.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &PaymentsConfig, base_url: &str) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| PaymentError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        let base = base_url.trim_end_matches('/');

        Ok(Self {
            inner: Arc::new(PaymentsClientInner {
                client,
                api_base: config.api_base.clone(),
                currency: config.currency,
                success_url: format!("{base}/checkout/success?session_id={SESSION_ID_PLACEHOLDER}"),
                cancel_url: format!("{base}/cart"),
            }),
        })
    }

    /// `{api_base}/checkout/sessions[/{id}]`, with `id` escaped as a path
    /// segment.
    fn sessions_url(&self, id: Option<&str>) -> Result<Url, PaymentError> {
        let mut url = self.inner.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| PaymentError::Parse("API base cannot hold a path".to_string()))?;
            segments.pop_if_empty().extend(["checkout", "sessions"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn read_session(response: reqwest::Response) -> Result<SessionResponse, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// Build the form body for a checkout session.
    fn checkout_form(
        &self,
        lines: &[CartLine],
        email: &Email,
    ) -> Result<Vec<(String, String)>, PaymentError> {
        if lines.is_empty() {
            return Err(PaymentError::EmptyCart);
        }

        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.inner.success_url.clone()),
            ("cancel_url".to_string(), self.inner.cancel_url.clone()),
            ("customer_email".to_string(), email.as_str().to_string()),
        ];

        for (i, line) in lines.iter().enumerate() {
            let unit_amount = Price::new(line.price, self.inner.currency)
                .minor_units()
                .filter(|amount| *amount >= 0)
                .ok_or_else(|| PaymentError::InvalidAmount(line.id.to_string()))?;

            let prefix = format!("line_items[{i}]");
            form.push((
                format!("{prefix}[price_data][currency]"),
                self.inner.currency.code().to_string(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                line.name.clone(),
            ));
            if !line.image.is_empty() {
                form.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    line.image.clone(),
                ));
            }
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                unit_amount.to_string(),
            ));
            form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
        }

        Ok(form)
    }

    /// Create a hosted checkout session for the given cart lines.
    ///
    /// # Errors
    ///
    /// Returns error if the cart is empty, the request fails, or the
    /// response carries no redirect URL.
    #[instrument(skip(self, lines, email), fields(lines = lines.len()))]
    pub async fn create_checkout_session(
        &self,
        lines: &[CartLine],
        email: &Email,
    ) -> Result<CheckoutSession, PaymentError> {
        let form = self.checkout_form(lines, email)?;
        let url = self.sessions_url(None)?;

        let response = self.inner.client.post(url).form(&form).send().await?;
        let session = Self::read_session(response).await?;

        let url = session
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| PaymentError::MissingRedirect(session.id.clone()))?;

        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    /// Whether the checkout session `session_id` has been paid.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects the id.
    #[instrument(skip(self))]
    pub async fn is_paid(&self, session_id: &str) -> Result<bool, PaymentError> {
        let url = self.sessions_url(Some(session_id))?;

        let response = self.inner.client.get(url).send().await?;
        let session = Self::read_session(response).await?;

        let paid = session.payment_status.as_deref() == Some("paid");
        tracing::debug!(
            session_id = %session.id,
            status = session.payment_status.as_deref().unwrap_or("unknown"),
            "Checkout session looked up"
        );
        Ok(paid)
    }
}
