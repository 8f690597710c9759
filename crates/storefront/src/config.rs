//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for catalog commands
//! - `CATALOG_GRAPHQL_URL` - GraphQL endpoint of the product catalog
//!
//! ## Optional
//! - `CATALOG_ADMIN_SECRET` - Admin secret sent with every catalog query
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache lifetime (default: 300)
//! - `CATALOG_CACHE_CAPACITY` - Maximum cached catalog responses (default: 1000)
//! - `STOREFRONT_DATA_DIR` - Directory holding the cart and wishlist (default: .cornershop)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".cornershop";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory the file-backed store writes the cart and wishlist to
    pub data_dir: PathBuf,
    /// Catalog API configuration, absent when no endpoint is configured
    pub catalog: Option<CatalogConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the admin secret.
#[derive(Clone)]
pub struct CatalogConfig {
    /// GraphQL endpoint
    pub graphql_url: Url,
    /// Admin secret, sent as `x-hasura-admin-secret`
    pub admin_secret: Option<SecretString>,
    /// How long cached responses stay fresh
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("graphql_url", &self.graphql_url.as_str())
            .field(
                "admin_secret",
                &self.admin_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(
            non_empty(&lookup, "STOREFRONT_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );
        let catalog = CatalogConfig::from_lookup(&lookup)?;
        let sentry_dsn = non_empty(&lookup, "SENTRY_DSN");

        Ok(Self {
            data_dir,
            catalog,
            sentry_dsn,
        })
    }

    /// The catalog configuration, required by catalog commands.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no catalog endpoint is set.
    pub fn require_catalog(&self) -> Result<&CatalogConfig, ConfigError> {
        self.catalog
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_GRAPHQL_URL".to_string()))
    }
}

impl CatalogConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = non_empty(lookup, "CATALOG_GRAPHQL_URL") else {
            return Ok(None);
        };
        let graphql_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CATALOG_GRAPHQL_URL".to_string(), e.to_string())
        })?;
        if !matches!(graphql_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_GRAPHQL_URL".to_string(),
                format!("unsupported scheme `{}`", graphql_url.scheme()),
            ));
        }

        let cache_ttl_secs = parse_or_default(lookup, "CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let cache_capacity = parse_or_default(lookup, "CATALOG_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        Ok(Some(Self {
            graphql_url,
            admin_secret: non_empty(lookup, "CATALOG_ADMIN_SECRET").map(SecretString::from),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating an empty value as unset.
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    non_empty(lookup, key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
