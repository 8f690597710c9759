//! Catalog client against the fake GraphQL backend.

#![allow(clippy::unwrap_used)]

use cornershop_core::{Price, ProductId};
use cornershop_integration_tests::fake_catalog::{FakeCatalog, Failure};
use cornershop_integration_tests::fixtures;
use cornershop_storefront::catalog::{CatalogClient, CatalogError, PriceOrder};
use serde_json::json;

async fn client_with_secret(secret: Option<&str>) -> (FakeCatalog, CatalogClient) {
    let (fake, url) = FakeCatalog::spawn().await.unwrap();
    let client = CatalogClient::new(&fixtures::catalog_config(url, secret));
    (fake, client)
}

async fn client() -> (FakeCatalog, CatalogClient) {
    client_with_secret(None).await
}

fn ids(products: &[cornershop_core::Product]) -> Vec<i64> {
    products.iter().map(|p| p.id.as_i64()).collect()
}

fn price(s: &str) -> Price {
    s.parse().unwrap()
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_all_products() {
    let (fake, client) = client().await;

    let products = client.products(None, None).await.unwrap();

    assert_eq!(ids(&products), vec![1, 2, 3, 4, 5]);
    assert_eq!(products, fixtures::products());
    assert_eq!(fake.operations(), vec!["GetProductsDefault"]);
}

#[tokio::test]
async fn test_products_sorted_by_price() {
    let (fake, client) = client().await;

    let asc = client.products(Some(PriceOrder::Asc), None).await.unwrap();
    let desc = client.products(Some(PriceOrder::Desc), None).await.unwrap();

    assert_eq!(ids(&asc), vec![3, 4, 5, 1, 2]);
    assert_eq!(ids(&desc), vec![2, 1, 5, 4, 3]);
    let requests = fake.requests();
    assert_eq!(requests.first().unwrap().variables, json!({ "sortBy": "asc" }));
}

#[tokio::test]
async fn test_products_in_category() {
    let (fake, client) = client().await;

    let clothing = client.products_by_category("Clothing").await.unwrap();
    let sorted = client
        .products(Some(PriceOrder::Desc), Some("Clothing"))
        .await
        .unwrap();

    assert_eq!(ids(&clothing), vec![3, 4]);
    assert_eq!(ids(&sorted), vec![4, 3]);
    assert_eq!(fake.operations(), vec!["GetProductsByCategory", "GetProducts"]);
}

#[tokio::test]
async fn test_unknown_category_is_empty() {
    let (_fake, client) = client().await;
    assert!(client.products_by_category("Toys").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_price_range_is_inclusive() {
    let (fake, client) = client().await;

    let products = client
        .products_by_price(price("19.99"), price("79.99"))
        .await
        .unwrap();

    assert_eq!(ids(&products), vec![3, 4]);
    let request = fake.requests().pop().unwrap();
    assert_eq!(request.operation_name, "GetProductsByPrice");
    assert_eq!(request.variables, json!({ "priceFrom": 19.99, "priceTo": 79.99 }));
}

#[tokio::test]
async fn test_search_matches_substring_ignoring_case() {
    let (fake, client) = client().await;

    let products = client.search_products("office").await.unwrap();

    assert_eq!(ids(&products), vec![5]);
    assert_eq!(
        fake.requests().pop().unwrap().variables,
        json!({ "searchInput": "%office%" })
    );
}

#[tokio::test]
async fn test_filtered_products() {
    let (fake, client) = client().await;

    let products = client
        .filtered_products(&["Jeans".to_string(), "T-Shirts".to_string()])
        .await
        .unwrap();

    assert_eq!(ids(&products), vec![3, 4]);
    assert_eq!(fake.operations(), vec!["GetFilteredProducts"]);
}

#[tokio::test]
async fn test_empty_filter_lists_everything() {
    let (fake, client) = client().await;

    let products = client.filtered_products(&[]).await.unwrap();

    assert_eq!(products.len(), 5);
    assert_eq!(fake.operations(), vec!["GetProductsDefault"]);
}

#[tokio::test]
async fn test_suggested_products_are_limited() {
    let (fake, client) = client().await;

    let products = client.suggested_products().await.unwrap();

    assert_eq!(products.len(), 5);
    assert_eq!(fake.requests().pop().unwrap().variables, json!({ "limit": 10 }));
}

// ============================================================================
// Single products and categories
// ============================================================================

#[tokio::test]
async fn test_product_by_id() {
    let (_fake, client) = client().await;

    let chair = client.product_by_id(ProductId::new(5)).await.unwrap();
    assert_eq!(chair, fixtures::product(5));

    let missing = client.product_by_id(ProductId::new(99)).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_require_missing_product_is_not_found() {
    let (_fake, client) = client().await;

    let err = client.require_product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_categories_with_subcategories() {
    let (_fake, client) = client().await;

    let categories = client.product_categories().await.unwrap();

    assert_eq!(categories, fixtures::categories());
    let garden = categories.iter().find(|c| c.name == "Home & Garden").unwrap();
    let names: Vec<&str> = garden.subcategories.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Furniture", "Tools"]);
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn test_listings_are_cached() {
    let (fake, client) = client().await;

    client.products(None, Some("Clothing")).await.unwrap();
    client.products(None, Some("Clothing")).await.unwrap();
    client.product_categories().await.unwrap();
    client.product_categories().await.unwrap();
    assert_eq!(fake.request_count(), 2);

    client.invalidate_all();
    client.products(None, Some("Clothing")).await.unwrap();
    assert_eq!(fake.request_count(), 3);
}

#[tokio::test]
async fn test_cache_keys_separate_orderings() {
    let (fake, client) = client().await;

    client.products(Some(PriceOrder::Asc), None).await.unwrap();
    client.products(Some(PriceOrder::Desc), None).await.unwrap();
    client.products(None, None).await.unwrap();

    assert_eq!(fake.request_count(), 3);
}

#[tokio::test]
async fn test_invalidate_single_product() {
    let (fake, client) = client().await;

    client.product_by_id(ProductId::new(1)).await.unwrap();
    client.product_by_id(ProductId::new(1)).await.unwrap();
    assert_eq!(fake.request_count(), 1);

    client.invalidate_product(ProductId::new(1)).await;
    client.product_by_id(ProductId::new(1)).await.unwrap();
    assert_eq!(fake.request_count(), 2);
}

#[tokio::test]
async fn test_search_is_not_cached() {
    let (fake, client) = client().await;

    client.search_products("jeans").await.unwrap();
    client.search_products("jeans").await.unwrap();

    assert_eq!(fake.request_count(), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (fake, client) = client().await;

    fake.fail_with(Failure::Status(503));
    assert!(client.products(None, None).await.is_err());

    fake.recover();
    assert_eq!(client.products(None, None).await.unwrap().len(), 5);
}

// ============================================================================
// Headers and failures
// ============================================================================

#[tokio::test]
async fn test_admin_secret_header() {
    let (fake, client) = client_with_secret(Some("hunter2")).await;
    client.products(None, None).await.unwrap();
    assert_eq!(
        fake.requests().pop().unwrap().admin_secret.as_deref(),
        Some("hunter2")
    );

    let (fake, client) = self::client().await;
    client.products(None, None).await.unwrap();
    assert!(fake.requests().pop().unwrap().admin_secret.is_none());
}

#[tokio::test]
async fn test_graphql_errors_are_surfaced() {
    let (fake, client) = client().await;
    fake.fail_with(Failure::GraphQL("field 'product' not found".to_string()));

    let err = client.products(None, None).await.unwrap_err();

    match err {
        CatalogError::GraphQL(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.first().unwrap().message, "field 'product' not found");
        }
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let (fake, client) = client().await;
    fake.fail_with(Failure::RateLimited(7));

    let err = client.search_products("chair").await.unwrap_err();

    assert!(matches!(err, CatalogError::RateLimited(7)));
}

#[tokio::test]
async fn test_http_status_is_error() {
    let (fake, client) = client().await;
    fake.fail_with(Failure::Status(503));

    let err = client.suggested_products().await.unwrap_err();

    assert!(err.to_string().contains("HTTP 503"));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let (fake, client) = client().await;
    fake.fail_with(Failure::Garbage);

    let err = client.product_categories().await.unwrap_err();

    assert!(matches!(err, CatalogError::Parse(_)));
}
