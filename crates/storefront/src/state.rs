//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use crate::backend::{BackendClient, BackendError};
use crate::cart::{CartError, CartStorage, CartStore, ClientKey, FileStorage, MemoryStorage};
use crate::catalog::Catalog;
use crate::config::{CartStorageKind, StorefrontConfig};
use crate::services::{KlaviyoClient, KlaviyoError, Newsletter, PaymentError, PaymentsClient};

/// Cart storage shared by every request.
pub type SharedCartStorage = Arc<dyn CartStorage>;

/// A cart store opened on the shared storage.
pub type SharedCartStore = CartStore<SharedCartStorage>;

/// How long an unused per-client cart lock is kept around.
const CART_LOCK_IDLE: Duration = Duration::from_secs(10 * 60);

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("payments client: {0}")]
    Payment(#[from] PaymentError),
    #[error("newsletter client: {0}")]
    Klaviyo(#[from] KlaviyoError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, cart storage, and outbound service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart_storage: SharedCartStorage,
    /// One lock per client; held for a whole open, operate, commit cycle.
    cart_locks: Cache<ClientKey, Arc<Mutex<()>>>,
    backend: Option<BackendClient>,
    payments: Option<PaymentsClient>,
    newsletter: Newsletter,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// Optional integrations that are not configured fall back to the
    /// built-in catalog, disabled checkout, and log-only newsletter.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client for a configured integration
    /// cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let cart_storage: SharedCartStorage = match config.cart.storage {
            CartStorageKind::Memory => Arc::new(MemoryStorage::new()),
            CartStorageKind::File => Arc::new(FileStorage::new(config.cart.dir.clone())),
        };

        let backend = config.backend.as_ref().map(BackendClient::new).transpose()?;
        let payments = config
            .payments
            .as_ref()
            .map(|payments| PaymentsClient::new(payments, &config.base_url))
            .transpose()?;
        let newsletter = match &config.klaviyo {
            Some(klaviyo) => Newsletter::Klaviyo(KlaviyoClient::new(klaviyo)?),
            None => Newsletter::LogOnly,
        };

        Ok(Self::from_parts(
            config,
            cart_storage,
            backend,
            payments,
            newsletter,
        ))
    }

    /// Assemble state from already-built parts.
    ///
    /// The catalog reads from `backend` when one is given.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        cart_storage: SharedCartStorage,
        backend: Option<BackendClient>,
        payments: Option<PaymentsClient>,
        newsletter: Newsletter,
    ) -> Self {
        let catalog = backend
            .clone()
            .map_or_else(Catalog::builtin, Catalog::Hosted);

        tracing::info!(
            catalog = catalog.source(),
            cart_storage = ?config.cart.storage,
            checkout = payments.is_some(),
            "Application state ready"
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart_storage,
                cart_locks: Cache::builder().time_to_idle(CART_LOCK_IDLE).build(),
                backend,
                payments,
                newsletter,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart_storage(&self) -> &SharedCartStorage {
        &self.inner.cart_storage
    }

    /// The hosted backend, if configured.
    #[must_use]
    pub fn backend(&self) -> Option<&BackendClient> {
        self.inner.backend.as_ref()
    }

    /// The payments client, if checkout is enabled.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentsClient> {
        self.inner.payments.as_ref()
    }

    #[must_use]
    pub fn newsletter(&self) -> &Newsletter {
        &self.inner.newsletter
    }

    /// Open `client`'s cart and run `op` against it on the blocking pool.
    ///
    /// Storage may touch the filesystem, so cart work never runs on the
    /// async executor. Calls for the same client run one at a time; calls
    /// for different clients do not wait on each other.
    ///
    /// # Errors
    ///
    /// Returns error if the cart cannot be loaded, `op` fails, or the
    /// blocking task does not complete.
    pub async fn with_cart<T, F>(&self, client: ClientKey, op: F) -> Result<T, CartError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SharedCartStore) -> Result<T, CartError> + Send + 'static,
    {
        let lock = self
            .inner
            .cart_locks
            .get_with(client.clone(), async { Arc::new(Mutex::new(())) })
            .await;
        let guard = lock.lock_owned().await;

        let storage = Arc::clone(&self.inner.cart_storage);
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut store = CartStore::open(storage, client)?;
            op(&mut store)
        })
        .await
        .map_err(|e| CartError::Task(e.to_string()))?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{NewCartLine, ProductId};

    use super::*;

    fn line(id: &str) -> NewCartLine {
        NewCartLine {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: "10.00".parse().unwrap(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_defaults_to_builtin_services() {
        let state = AppState::new(StorefrontConfig::default()).unwrap();
        assert_eq!(state.catalog().source(), "builtin");
        assert!(state.backend().is_none());
        assert!(state.payments().is_none());
        assert!(matches!(state.newsletter(), Newsletter::LogOnly));
    }

    #[tokio::test]
    async fn test_with_cart_persists_between_calls() {
        let state = AppState::new(StorefrontConfig::default()).unwrap();
        let client = ClientKey::generate();

        state
            .with_cart(client.clone(), |cart| {
                cart.add_item(line("1"))?;
                cart.add_item(line("1"))
            })
            .await
            .unwrap();

        let count = state
            .with_cart(client, |cart| Ok(cart.total_items()))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_with_cart_isolates_clients() {
        let state = AppState::new(StorefrontConfig::default()).unwrap();

        state
            .with_cart(ClientKey::generate(), |cart| cart.add_item(line("1")))
            .await
            .unwrap();

        let other = state
            .with_cart(ClientKey::generate(), |cart| Ok(cart.is_empty()))
            .await
            .unwrap();
        assert!(other);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_with_cart_serializes_same_client() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::from_parts(
            StorefrontConfig::default(),
            Arc::new(FileStorage::new(dir.path())),
            None,
            None,
            Newsletter::LogOnly,
        );
        let client = ClientKey::generate();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..100 {
            let state = state.clone();
            let client = client.clone();
            tasks.spawn(async move {
                state
                    .with_cart(client, |cart| cart.add_item(line("1")))
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let count = state
            .with_cart(client, |cart| Ok(cart.total_items()))
            .await
            .unwrap();
        assert_eq!(count, 100);
    }
}
