//! Persisted cart inspection commands.
//!
//! Work directly on the file cart storage used by a storefront running with
//! `STOREFRONT_CART_STORAGE=file`.
//!
//! # Usage
//!
//! ```bash
//! # List clients with a saved cart
//! shop-cli cart list
//!
//! # Show one client's cart
//! shop-cli cart show -c 0b6f4c1e-2f9a-4c55-9d0e-3a1f8f2b7c11
//!
//! # Empty one client's cart
//! shop-cli cart clear -c 0b6f4c1e-2f9a-4c55-9d0e-3a1f8f2b7c11 --dir data/carts
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_CART_DIR` - Default cart directory when `--dir` is omitted

use std::path::{Path, PathBuf};

use shopfront_core::Price;
use shopfront_storefront::cart::{CartError, CartStore, ClientKey, FileStorage, StorageError};
use shopfront_storefront::config::{ConfigError, StorefrontConfig};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client keys are UUIDs.
    #[error("Invalid client key {0}: {1}")]
    InvalidClient(String, String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// Resolve the cart directory: the flag if given, else configuration.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded.
pub fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf, CartCommandError> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(StorefrontConfig::from_env()?.cart.dir),
    }
}

fn parse_client(client: &str) -> Result<ClientKey, CartCommandError> {
    client
        .parse::<ClientKey>()
        .map_err(|e| CartCommandError::InvalidClient(client.to_owned(), e.to_string()))
}

/// Log every client with a saved cart.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list(dir: &Path) -> Result<Vec<ClientKey>, CartCommandError> {
    let storage = FileStorage::new(dir);
    let clients = storage.clients()?;

    for client in &clients {
        tracing::info!(%client, "Saved cart");
    }
    tracing::info!(count = clients.len(), dir = %dir.display(), "Cart clients");

    Ok(clients)
}

/// Log one client's cart lines and totals.
///
/// # Errors
///
/// Returns an error if the client key is invalid or the cart cannot be read.
pub fn show(dir: &Path, client: &str) -> Result<(), CartCommandError> {
    let storage = FileStorage::new(dir);
    let store = CartStore::open(&storage, parse_client(client)?)?;

    if store.is_empty() {
        tracing::info!(%client, "Cart is empty");
        return Ok(());
    }

    for line in store.lines() {
        tracing::info!(
            id = %line.id,
            quantity = line.quantity,
            price = %Price::usd(line.price),
            line_total = %Price::usd(line.line_total()),
            "{}",
            line.name
        );
    }
    tracing::info!(
        items = store.total_items(),
        total = %Price::usd(store.total_price()),
        "Cart totals"
    );

    Ok(())
}

/// Empty one client's cart.
///
/// # Errors
///
/// Returns an error if the client key is invalid or the commit fails.
pub fn clear(dir: &Path, client: &str) -> Result<(), CartCommandError> {
    let storage = FileStorage::new(dir);
    let mut store = CartStore::open(&storage, parse_client(client)?)?;
    let items = store.total_items();

    store.clear_cart()?;
    tracing::info!(%client, items, "Cart cleared");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{NewCartLine, ProductId};

    use super::*;

    fn seed_cart(dir: &Path) -> ClientKey {
        let storage = FileStorage::new(dir);
        let client = ClientKey::generate();
        let mut store = CartStore::open(&storage, client.clone()).unwrap();
        store
            .add_item(NewCartLine {
                id: ProductId::new("1"),
                name: "Wireless Bluetooth Headphones".to_string(),
                price: "99.99".parse().unwrap(),
                image: String::new(),
            })
            .unwrap();
        client
    }

    #[test]
    fn test_list_finds_saved_carts() {
        let dir = tempfile::tempdir().unwrap();
        let client = seed_cart(dir.path());

        assert_eq!(list(dir.path()).unwrap(), vec![client]);
    }

    #[test]
    fn test_clear_empties_cart() {
        let dir = tempfile::tempdir().unwrap();
        let client = seed_cart(dir.path());

        clear(dir.path(), &client.to_string()).unwrap();

        let storage = FileStorage::new(dir.path());
        assert!(CartStore::open(&storage, client).unwrap().is_empty());
        assert!(list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_invalid_client() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            show(dir.path(), "../../etc/passwd"),
            Err(CartCommandError::InvalidClient(..))
        ));
    }
}
