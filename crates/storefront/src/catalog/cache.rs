//! Cache types for catalog responses.

use cornershop_core::{Category, Price, Product, ProductId};

use super::PriceOrder;

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products {
        order: Option<PriceOrder>,
        category: Option<String>,
    },
    PriceRange {
        from: Price,
        to: Price,
    },
    Product(ProductId),
    Filtered(Vec<String>),
    Suggested,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
}
