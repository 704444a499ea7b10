//! Storefront configuration loaded from environment variables.
//!
//! Every variable is optional; an empty environment gives a development
//! storefront with the built-in catalog, in-memory carts and no outbound
//! integrations.
//!
//! # Environment Variables
//!
//! ## Server
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//!
//! ## Cart
//! - `STOREFRONT_CART_STORAGE` - `memory` (default) or `file`
//! - `STOREFRONT_CART_DIR` - Blob directory for `file` storage (default: data/carts)
//! - `STOREFRONT_TAX_RATE` - Tax rate shown in the order summary (default: 0.08)
//!
//! ## Hosted backend (both or neither)
//! - `BACKEND_URL` - Project URL, e.g. `https://abc.supabase.co`
//! - `BACKEND_ANON_KEY` - Anon API key
//!
//! ## Payments
//! - `STRIPE_SECRET_KEY` - Secret API key (validated)
//! - `STRIPE_CURRENCY` - Charge currency (default: usd)
//! - `STRIPE_API_BASE` - API root (default: `https://api.stripe.com/v1`)
//!
//! ## Newsletter (both or neither)
//! - `KLAVIYO_API_KEY` - Private API key (validated)
//! - `KLAVIYO_LIST_ID` - List to subscribe to
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Stripe API root used when `STRIPE_API_BASE` is unset.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Cart persistence
    pub cart: CartConfig,
    /// Tax rate applied in the order summary
    pub tax_rate: Decimal,
    /// Hosted catalog/order backend
    pub backend: Option<BackendConfig>,
    /// Hosted payment page
    pub payments: Option<PaymentsConfig>,
    /// Newsletter provider
    pub klaviyo: Option<KlaviyoConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Which cart storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartStorageKind {
    #[default]
    Memory,
    File,
}

impl FromStr for CartStorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(format!("expected 'memory' or 'file', got '{other}'")),
        }
    }
}

/// Cart persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub storage: CartStorageKind,
    /// Blob directory for file storage
    pub dir: PathBuf,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage: CartStorageKind::Memory,
            dir: PathBuf::from("data/carts"),
        }
    }
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project URL
    pub url: Url,
    /// Anon API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct PaymentsConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// Charge currency
    pub currency: CurrencyCode,
    /// API root that checkout session paths are appended to
    pub api_base: Url,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

/// Klaviyo configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct KlaviyoConfig {
    /// Private API key
    pub api_key: SecretString,
    /// Newsletter list ID
    pub list_id: String,
}

impl std::fmt::Debug for KlaviyoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoConfig")
            .field("api_key", &"[REDACTED]")
            .field("list_id", &self.list_id)
            .finish()
    }
}

impl Default for StorefrontConfig {
    /// Development defaults: local bind, built-in catalog, in-memory carts,
    /// no outbound integrations.
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cart: CartConfig::default(),
            tax_rate: Decimal::new(8, 2),
            backend: None,
            payments: None,
            klaviyo: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

/// Source of configuration values.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, only half of a paired
    /// integration is configured, or a secret fails validation (placeholder
    /// detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_env_or(env, "STOREFRONT_HOST", defaults.host)?;
        let port = parse_env_or(env, "STOREFRONT_PORT", defaults.port)?;
        let base_url = get_env_or_default(env, "STOREFRONT_BASE_URL", &defaults.base_url);
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let cart = CartConfig {
            storage: parse_env_or(env, "STOREFRONT_CART_STORAGE", defaults.cart.storage)?,
            dir: get_optional_env(env, "STOREFRONT_CART_DIR")
                .map_or(defaults.cart.dir, PathBuf::from),
        };

        let tax_rate = parse_env_or(env, "STOREFRONT_TAX_RATE", defaults.tax_rate)?;
        if tax_rate < Decimal::ZERO || tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_TAX_RATE".to_string(),
                format!("must be in [0, 1), got {tax_rate}"),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            cart,
            tax_rate,
            backend: BackendConfig::from_lookup(env)?,
            payments: PaymentsConfig::from_lookup(env)?,
            klaviyo: KlaviyoConfig::from_lookup(env)?,
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
            sentry_environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_lookup(env: Lookup<'_>) -> Result<Option<Self>, ConfigError> {
        let Some((url, anon_key)) = get_paired_env(env, "BACKEND_URL", "BACKEND_ANON_KEY")? else {
            return Ok(None);
        };

        let url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

        Ok(Some(Self {
            url,
            anon_key: SecretString::from(anon_key),
        }))
    }
}

impl PaymentsConfig {
    fn from_lookup(env: Lookup<'_>) -> Result<Option<Self>, ConfigError> {
        let Some(secret_key) = get_optional_env(env, "STRIPE_SECRET_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&secret_key, "STRIPE_SECRET_KEY")?;

        let api_base = get_env_or_default(env, "STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE);
        let api_base = Url::parse(&api_base).map_err(|e| {
            ConfigError::InvalidEnvVar("STRIPE_API_BASE".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            secret_key: SecretString::from(secret_key),
            currency: parse_env_or(env, "STRIPE_CURRENCY", CurrencyCode::USD)?,
            api_base,
        }))
    }
}

impl KlaviyoConfig {
    fn from_lookup(env: Lookup<'_>) -> Result<Option<Self>, ConfigError> {
        let Some((api_key, list_id)) = get_paired_env(env, "KLAVIYO_API_KEY", "KLAVIYO_LIST_ID")?
        else {
            return Ok(None);
        };
        validate_secret_strength(&api_key, "KLAVIYO_API_KEY")?;

        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            list_id,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable. Empty values count as unset.
fn get_optional_env(env: Lookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(env: Lookup<'_>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when unset.
fn parse_env_or<T>(env: Lookup<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(env, key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Get two variables that must be set together.
fn get_paired_env(
    env: Lookup<'_>,
    first: &str,
    second: &str,
) -> Result<Option<(String, String)>, ConfigError> {
    match (get_optional_env(env, first), get_optional_env(env, second)) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(second.to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar(first.to_string())),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}
