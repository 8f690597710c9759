//! Catalog API client implementation.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP. Listings,
//! single products and categories are cached using `moka`; free-text
//! searches are not.

use std::sync::Arc;

use cornershop_core::{Category, Price, Product, ProductId};
use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::queries::{
    GetFilteredProducts, GetProductById, GetProductCategories, GetProducts, GetProductsByCategory,
    GetProductsByPrice, GetProductsDefault, GetProductsSorted, GetSuggestedProducts, NoVariables,
    PriceOrder, ProductsData, SearchProducts, get_filtered_products, get_product_by_id,
    get_products, get_products_by_category, get_products_by_price, get_products_sorted,
    get_suggested_products, search_products,
};
use super::{CatalogError, GraphQLError};
use crate::config::CatalogConfig;

/// Number of products shown as suggestions.
const SUGGESTED_LIMIT: i64 = 10;

/// Header carrying the backend's admin secret.
const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog GraphQL API.
///
/// Cloning is cheap; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
    admin_secret: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_url.clone(),
                admin_secret: config.admin_secret.clone(),
                cache,
            }),
        }
    }

    /// GraphQL endpoint queries are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, CatalogError> {
        let request_body = Q::build_query(variables);

        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&request_body);
        if let Some(secret) = &self.inner.admin_secret {
            request = request.header(ADMIN_SECRET_HEADER, secret.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse catalog GraphQL response"
                );
                return Err(CatalogError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(CatalogError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                "Catalog GraphQL response has no data and no errors"
            );
            CatalogError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    /// Run a product query, serving it from the cache when possible.
    async fn cached_products<Q>(
        &self,
        key: CacheKey,
        variables: Q::Variables,
    ) -> Result<Vec<Product>, CatalogError>
    where
        Q: GraphQLQuery<ResponseData = ProductsData>,
    {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(key = ?key, "Cache hit for products");
            return Ok(products);
        }

        let products = self.execute::<Q>(variables).await?.product;
        debug!(count = products.len(), "Fetched products");

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, optionally restricted to one category and ordered by
    /// price.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        order: Option<PriceOrder>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Products {
            order,
            category: category.map(str::to_string),
        };

        match (category, order) {
            (Some(category), Some(sort_by)) => {
                self.cached_products::<GetProducts>(
                    key,
                    get_products::Variables {
                        category: category.to_string(),
                        sort_by,
                    },
                )
                .await
            }
            (Some(category), None) => {
                self.cached_products::<GetProductsByCategory>(
                    key,
                    get_products_by_category::Variables {
                        category: category.to_string(),
                    },
                )
                .await
            }
            (None, Some(sort_by)) => {
                self.cached_products::<GetProductsSorted>(
                    key,
                    get_products_sorted::Variables { sort_by },
                )
                .await
            }
            (None, None) => {
                self.cached_products::<GetProductsDefault>(key, NoVariables)
                    .await
            }
        }
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        self.products(None, Some(category)).await
    }

    /// Products priced between `from` and `to`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn products_by_price(
        &self,
        from: Price,
        to: Price,
    ) -> Result<Vec<Product>, CatalogError> {
        self.cached_products::<GetProductsByPrice>(
            CacheKey::PriceRange { from, to },
            get_products_by_price::Variables {
                price_from: from,
                price_to: to,
            },
        )
        .await
    }

    /// Products whose name contains `text`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, text: &str) -> Result<Vec<Product>, CatalogError> {
        let data = self
            .execute::<SearchProducts>(search_products::Variables::containing(text))
            .await?;
        debug!(count = data.product.len(), "Search finished");
        Ok(data.product)
    }

    /// A single product, or `None` if no product has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self
            .cached_products::<GetProductById>(
                CacheKey::Product(id),
                get_product_by_id::Variables { id },
            )
            .await?;
        Ok(products.into_iter().next())
    }

    /// A single product that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id, or an
    /// error if the API request fails.
    pub async fn require_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.product_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {id}")))
    }

    /// Products in any of the named subcategories. An empty set means no
    /// filter: every product is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn filtered_products(
        &self,
        subcategories: &[String],
    ) -> Result<Vec<Product>, CatalogError> {
        if subcategories.is_empty() {
            return self.products(None, None).await;
        }

        let mut key_names = subcategories.to_vec();
        key_names.sort();
        key_names.dedup();

        self.cached_products::<GetFilteredProducts>(
            CacheKey::Filtered(key_names),
            get_filtered_products::Variables {
                filter: subcategories.to_vec(),
            },
        )
        .await
    }

    /// A short list of products to suggest.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn suggested_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.cached_products::<GetSuggestedProducts>(
            CacheKey::Suggested,
            get_suggested_products::Variables {
                limit: SUGGESTED_LIMIT,
            },
        )
        .await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Every category with its subcategories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn product_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self
            .execute::<GetProductCategories>(NoVariables)
            .await?
            .category;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop the cached copy of one product.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("cache_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config() -> CatalogConfig {
        CatalogConfig {
            graphql_url: Url::parse("http://127.0.0.1:9/v1/graphql").unwrap(),
            admin_secret: Some(SecretString::from("hunter2".to_string())),
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 10,
        }
    }

    #[test]
    fn test_client_debug_hides_secret() {
        let client = CatalogClient::new(&config());
        let debug = format!("{client:?}");
        assert!(debug.contains("127.0.0.1:9"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = CatalogClient::new(&config());
        let err = client.suggested_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
