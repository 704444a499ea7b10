//! Cart store: the shopper's cart plus its persisted mirror.
//!
//! A [`CartStore`] is opened for one client from a [`CartStorage`] backend.
//! It reads the mirror once when opened and commits the whole cart back
//! after every mutating operation, so a store opened later on the same
//! backend and key sees exactly the same lines. There is no global cart:
//! handlers get a store built from the storage injected into `AppState`.
//!
//! # Example
//!
//! ```rust
//! use shopfront_core::{NewCartLine, ProductId};
//! use shopfront_storefront::cart::{CartStore, ClientKey, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! let client = ClientKey::generate();
//!
//! let mut store = CartStore::open(&storage, client.clone()).unwrap();
//! store
//!     .add_item(NewCartLine {
//!         id: ProductId::new("1"),
//!         name: "Wireless Bluetooth Headphones".to_string(),
//!         price: "99.99".parse().unwrap(),
//!         image: "https://img.example.com/1.jpg".to_string(),
//!     })
//!     .unwrap();
//!
//! let reloaded = CartStore::open(&storage, client).unwrap();
//! assert_eq!(reloaded.total_items(), 1);
//! ```

mod storage;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{Cart, CartLine, NewCartLine, ProductId};
use thiserror::Error;
use uuid::Uuid;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

/// Errors from cart operations.
///
/// Cart logic itself cannot fail; only committing to (or reading from) the
/// persisted mirror can.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// The blocking task running the operation panicked or was cancelled.
    #[error("cart task failed: {0}")]
    Task(String),
}

/// Identifies one client's persisted cart.
///
/// Always a UUID, so it is safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(Uuid);

impl ClientKey {
    /// Mint a new random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ClientKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The cart of one client, bound to the storage that mirrors it.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    client: ClientKey,
    cart: Cart,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart for `client`, reading its persisted mirror.
    ///
    /// A blob that cannot be decoded is discarded with a warning and the
    /// client starts with an empty cart; it is overwritten on the next
    /// commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the mirror cannot be read at all.
    pub fn open(storage: S, client: ClientKey) -> Result<Self, CartError> {
        let cart = match storage.load(&client) {
            Ok(lines) => Cart::from_lines(lines),
            Err(StorageError::Corrupt { client, source }) => {
                tracing::warn!(%client, error = %source, "Discarding unreadable cart blob");
                Cart::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            storage,
            client,
            cart,
        })
    }

    #[must_use]
    pub const fn client(&self) -> &ClientKey {
        &self.client
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Add one unit of `candidate` (see [`Cart::add_item`]) and commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the commit fails; the cart is left
    /// as it was before the call.
    pub fn add_item(&mut self, candidate: NewCartLine) -> Result<(), CartError> {
        self.apply(|cart| cart.add_item(candidate))
    }

    /// Add `units` of `candidate` (see [`Cart::add_units`]) with a single
    /// commit. Either every unit is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the commit fails; the cart is left
    /// as it was before the call.
    pub fn add_units(&mut self, candidate: NewCartLine, units: u32) -> Result<(), CartError> {
        self.apply(|cart| cart.add_units(candidate, units))
    }

    /// Set a line's quantity, removing it when `quantity <= 0`, and commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the commit fails; the cart is left
    /// as it was before the call.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<(), CartError> {
        self.apply(|cart| cart.update_quantity(id, quantity))
    }

    /// Remove the line for `id` if present and commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the commit fails; the cart is left
    /// as it was before the call.
    pub fn remove_item(&mut self, id: &ProductId) -> Result<(), CartError> {
        self.apply(|cart| cart.remove_item(id))
    }

    /// Empty the cart and commit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the commit fails; the cart is left
    /// as it was before the call.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.apply(Cart::clear)
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    /// Run a mutation, then commit. Rolls the mutation back if the commit
    /// fails so memory never runs ahead of the mirror.
    fn apply(&mut self, mutation: impl FnOnce(&mut Cart)) -> Result<(), CartError> {
        let previous = self.cart.clone();
        mutation(&mut self.cart);

        if let Err(e) = self.commit() {
            tracing::error!(client = %self.client, error = %e, "Cart commit failed");
            self.cart = previous;
            return Err(e);
        }
        Ok(())
    }

    fn commit(&self) -> Result<(), CartError> {
        self.storage.save(&self.client, self.cart.lines())?;
        tracing::debug!(
            client = %self.client,
            lines = self.cart.len(),
            items = self.cart.total_items(),
            "Cart committed"
        );
        Ok(())
    }
}
