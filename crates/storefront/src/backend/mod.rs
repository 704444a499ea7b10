//! Hosted backend client (PostgREST-style REST API).
//!
//! Reads the `products` table and writes `orders` / `order_items` after a
//! completed checkout. Every request carries the project's anon key both as
//! `apikey` and as a bearer token.
//!
//! Product reads are cached with `moka` (5-minute TTL). Order writes are
//! never cached or retried.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use shopfront_core::{ALL_CATEGORIES, NewOrder, NewOrderItem, Order, Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};

/// Errors from the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected rows.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// An insert returned no row.
    #[error("insert into {0} returned no rows")]
    EmptyInsert(&'static str),

    /// The anon key cannot be sent as a header.
    #[error("invalid anon key: {0}")]
    InvalidKey(String),
}

/// Client for the hosted catalog and order tables.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_base: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("rest_base", &self.inner.rest_base)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let key = config.anon_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|e| BackendError::InvalidKey(e.to_string()))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| BackendError::InvalidKey(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                rest_base: format!("{}/rest/v1", config.url.as_str().trim_end_matches('/')),
                cache,
            }),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        Ok(Url::parse(&format!("{}/{table}", self.inner.rest_base))?)
    }

    /// `GET /products?select=*&order=created_at.desc[&category=eq.X]`
    fn products_url(&self, category: &str) -> Result<Url, BackendError> {
        let mut url = self.table_url("products")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            query.append_pair("order", "created_at.desc");
            if category != ALL_CATEGORIES {
                query.append_pair("category", &format!("eq.{category}"));
            }
        }
        Ok(url)
    }

    fn product_url(&self, id: &ProductId) -> Result<Url, BackendError> {
        let mut url = self.table_url("products")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("limit", "1");
        Ok(url)
    }

    async fn read_rows<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Vec<T>, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Catalog reads
    // =========================================================================

    /// All products, newest first, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows cannot be parsed.
    #[instrument(skip(self))]
    pub async fn products(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let cache_key = CacheKey::Products(category.to_string());

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.products_url(category)?;
        let response = self.inner.client.get(url).send().await?;
        let products: Vec<Product> = Self::read_rows(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row cannot be parsed.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let url = self.product_url(id)?;
        let response = self.inner.client.get(url).send().await?;
        let product = Self::read_rows::<Product>(response).await?.into_iter().next();

        if let Some(product) = &product {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Insert or update products by id. Used by the seeding CLI.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn upsert_products(&self, products: &[Product]) -> Result<usize, BackendError> {
        let url = self.table_url("products")?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(products)
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = Self::read_rows(response).await?;
        self.inner.cache.invalidate_all();
        Ok(rows.len())
    }

    // =========================================================================
    // Order writes
    // =========================================================================

    /// Insert an order and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no row comes back.
    #[instrument(skip(self, order), fields(total = %order.total_amount))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let url = self.table_url("orders")?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&[order])
            .send()
            .await?;

        Self::read_rows::<Order>(response)
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::EmptyInsert("orders"))
    }

    /// Insert the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn create_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        if items.is_empty() {
            return Ok(());
        }

        let url = self.table_url("order_items")?;
        let response = self.inner.client.post(url).json(items).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
