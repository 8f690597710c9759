//! Application state shared across commands.

use std::sync::Arc;

use cornershop_core::{Product, ProductId};

use crate::catalog::{CatalogClient, CategoryFilter};
use crate::collection::{Cart, ErrorChannel, Outcome, Toggle, Wishlist};
use crate::config::{ConfigError, StorefrontConfig};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::storage::{FileStore, SharedStore, StorageError};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// cart, the wishlist, the catalog client and the channels they report on.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    errors: ErrorChannel,
    cart: Cart,
    wishlist: Wishlist,
    catalog: Option<CatalogClient>,
    category_filter: CategoryFilter,
}

impl AppState {
    /// Create the application state backed by files in the configured data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory path names a regular file.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        if config.data_dir.is_file() {
            return Err(StorageError::Unavailable(format!(
                "data directory {} is a file",
                config.data_dir.display()
            ))
            .into());
        }
        let store: SharedStore = Arc::new(FileStore::new(&config.data_dir));
        Ok(Self::with_store(config, store, ErrorChannel::new()))
    }

    /// Create the application state on top of an existing store.
    ///
    /// Persistence failures, including those hit while loading the cart and
    /// wishlist, are reported on `errors`.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: SharedStore, errors: ErrorChannel) -> Self {
        let cart = Cart::open(Arc::clone(&store), errors.clone());
        let wishlist = Wishlist::open(store, errors.clone());
        let catalog = config.catalog.as_ref().map(CatalogClient::new);

        tracing::debug!(
            cart = cart.len(),
            wishlist = wishlist.len(),
            catalog = catalog.is_some(),
            "Application state ready"
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                errors,
                cart,
                wishlist,
                catalog,
                category_filter: CategoryFilter::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence error channel.
    #[must_use]
    pub fn errors(&self) -> &ErrorChannel {
        &self.inner.errors
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.inner.cart
    }

    /// Get a reference to the wishlist.
    #[must_use]
    pub fn wishlist(&self) -> &Wishlist {
        &self.inner.wishlist
    }

    /// Get a reference to the category announcement channel.
    #[must_use]
    pub fn category_filter(&self) -> &CategoryFilter {
        &self.inner.category_filter
    }

    /// Get a reference to the catalog client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no catalog endpoint is configured.
    pub fn catalog(&self) -> Result<&CatalogClient> {
        self.inner.catalog.as_ref().ok_or_else(|| {
            ConfigError::MissingEnvVar("CATALOG_GRAPHQL_URL".to_string()).into()
        })
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Look up a product in the catalog and add `quantity` copies of it to
    /// the cart.
    ///
    /// Stops at the first copy storage rejects; copies added before that stay
    /// in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero or the product cannot be
    /// fetched.
    pub async fn add_to_cart(&self, id: ProductId, quantity: u32) -> Result<Outcome> {
        if quantity == 0 {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".to_string(),
            ));
        }

        let product = self.catalog()?.require_product(id).await?;
        let outcome = self.add_copies(&product, quantity);
        if outcome.is_committed() {
            let product_id = id.to_string();
            let quantity = quantity.to_string();
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[
                    ("product_id", product_id.as_str()),
                    ("quantity", quantity.as_str()),
                ]),
            );
        }
        Ok(outcome)
    }

    /// Remove every copy of a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the cart.
    pub fn remove_from_cart(&self, id: ProductId) -> Result<Outcome> {
        if !self.cart().contains_id(id) {
            return Err(AppError::NotFound(format!("Product {id} is not in the cart")));
        }
        let outcome = self.cart().remove_id(id);
        if outcome.is_committed() {
            let product_id = id.to_string();
            add_breadcrumb(
                "cart",
                "Removed product",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
        Ok(outcome)
    }

    fn add_copies(&self, product: &Product, quantity: u32) -> Outcome {
        for _ in 0..quantity {
            if self.cart().append(product.clone()) == Outcome::RolledBack {
                return Outcome::RolledBack;
            }
        }
        Outcome::Committed
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Look up a product in the catalog and save it to the wishlist unless
    /// it is already there.
    ///
    /// Returns `None` when the product was already saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched.
    pub async fn add_to_wishlist(&self, id: ProductId) -> Result<Option<Outcome>> {
        if self.wishlist().contains_id(id) {
            return Ok(None);
        }
        let product = self.catalog()?.require_product(id).await?;
        Ok(self.wishlist().add_once(product))
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the wishlist.
    pub fn remove_from_wishlist(&self, id: ProductId) -> Result<Outcome> {
        if !self.wishlist().contains_id(id) {
            return Err(AppError::NotFound(format!(
                "Product {id} is not in the wishlist"
            )));
        }
        Ok(self.wishlist().remove_id(id))
    }

    /// Add a product to the wishlist if absent, remove it if present.
    ///
    /// Only products missing from the wishlist are looked up in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has to be fetched and cannot be.
    pub async fn toggle_wishlist(&self, id: ProductId) -> Result<Toggle> {
        let saved = self
            .wishlist()
            .snapshot()
            .into_iter()
            .find(|p| p.id == id);
        let product = match saved {
            Some(product) => product,
            None => self.catalog()?.require_product(id).await?,
        };
        let toggle = self.wishlist().toggle(product);
        tracing::debug!(product_id = %id, ?toggle, "Toggled wishlist entry");
        Ok(toggle)
    }

    /// Copy a saved product into the cart. The product stays in the
    /// wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the wishlist.
    pub fn wishlist_to_cart(&self, id: ProductId) -> Result<Outcome> {
        let product = self
            .wishlist()
            .snapshot()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Product {id} is not in the wishlist")))?;
        Ok(self.cart().append(product))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("cart", &self.inner.cart)
            .field("wishlist", &self.inner.wishlist)
            .field("catalog", &self.inner.catalog)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use std::sync::Mutex;

    use super::*;
    use crate::collection::PersistError;
    use crate::collection::tests::product;
    use crate::reactive::Observable;
    use crate::storage::MemoryStore;

    fn offline_config() -> StorefrontConfig {
        StorefrontConfig {
            data_dir: PathBuf::from("unused"),
            catalog: None,
            sentry_dsn: None,
        }
    }

    fn offline_state() -> AppState {
        AppState::with_store(
            offline_config(),
            Arc::new(MemoryStore::new()),
            ErrorChannel::new(),
        )
    }

    #[test]
    fn test_catalog_missing_is_config_error() {
        let state = offline_state();
        assert!(matches!(state.catalog(), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_lookup() {
        let state = offline_state();
        let err = state.add_to_cart(ProductId::new(1), 0).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_wishlist_to_cart_keeps_wishlist_entry() {
        let state = offline_state();
        state.wishlist().append(product(4, 7999));

        assert!(state.wishlist_to_cart(ProductId::new(4)).unwrap().is_committed());
        assert!(state.cart().contains_id(ProductId::new(4)));
        assert!(state.wishlist().contains_id(ProductId::new(4)));
    }

    #[test]
    fn test_missing_entries_are_not_found() {
        let state = offline_state();
        assert!(matches!(
            state.wishlist_to_cart(ProductId::new(9)),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            state.remove_from_cart(ProductId::new(9)),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            state.remove_from_wishlist(ProductId::new(9)),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_saved_product_needs_no_catalog() {
        let state = offline_state();
        state.wishlist().append(product(2, 100));

        let toggle = state.toggle_wishlist(ProductId::new(2)).await.unwrap();
        assert_eq!(toggle, Toggle::Removed);
        assert!(state.wishlist().is_empty());
    }

    #[test]
    fn test_cart_and_wishlist_share_error_channel() {
        let store = Arc::new(MemoryStore::with_entries([
            ("cart", "invalid json{"),
            ("wishlist", "{}"),
        ]));
        let errors = ErrorChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = errors.subscribe(move |e: &PersistError| sink.lock().unwrap().push(e.key().to_string()));

        let state = AppState::with_store(offline_config(), store, errors);
        assert!(state.cart().is_empty());
        assert!(state.wishlist().is_empty());
        assert_eq!(*seen.lock().unwrap(), vec!["cart", "wishlist"]);
    }
}
