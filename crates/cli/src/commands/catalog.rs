//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # List the built-in catalog
//! shop-cli catalog list
//!
//! # Upsert the built-in catalog into the hosted backend
//! shop-cli catalog seed
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Hosted backend project URL
//! - `BACKEND_ANON_KEY` - Hosted backend API key

use shopfront_core::Price;
use shopfront_storefront::backend::{BackendClient, BackendError};
use shopfront_storefront::catalog::fixtures;
use shopfront_storefront::config::{ConfigError, StorefrontConfig};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Seeding needs a backend to write to.
    #[error("Hosted backend not configured (set BACKEND_URL and BACKEND_ANON_KEY)")]
    BackendNotConfigured,

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Log every built-in product.
pub fn list() {
    let products = fixtures::products();
    for product in &products {
        tracing::info!(
            id = %product.id,
            category = %product.category,
            price = %Price::usd(product.price),
            stock = product.stock_quantity,
            "{}",
            product.name
        );
    }
    tracing::info!(count = products.len(), "Built-in catalog");
}

/// Upsert the built-in products into the hosted backend.
///
/// Existing rows with the same id are updated in place, so seeding twice is
/// harmless.
///
/// # Errors
///
/// Returns an error if configuration is invalid, no backend is configured,
/// or the upsert request fails.
pub async fn seed() -> Result<usize, CatalogError> {
    let config = StorefrontConfig::from_env()?;
    let backend_config = config
        .backend
        .as_ref()
        .ok_or(CatalogError::BackendNotConfigured)?;

    let client = BackendClient::new(backend_config)?;
    tracing::info!(url = %backend_config.url, "Seeding hosted catalog...");

    let written = client.upsert_products(&fixtures::products()).await?;
    tracing::info!(written, "Catalog seeded");

    Ok(written)
}
