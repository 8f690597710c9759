//! Catalog product and category types.
//!
//! Field names follow the catalog's GraphQL schema (`categoryId`, `inStock`,
//! `EAN`), which is also the shape persisted for cart and wishlist entries.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, SubcategoryId};
use super::price::Price;

/// European Article Number (barcode) of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ean(u64);

impl Ean {
    /// Create an EAN from its numeric value.
    #[must_use]
    pub const fn new(code: u64) -> Self {
        Self(code)
    }

    /// Get the numeric value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:013}", self.0)
    }
}

/// Denormalized category reference carried on a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// Denormalized subcategory reference carried on a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubcategoryRef {
    pub id: SubcategoryId,
    pub name: String,
}

/// A catalog product.
///
/// Products are produced by the catalog and stored by value in the cart and
/// wishlist; nothing in this workspace mutates one after it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub category: CategoryRef,
    pub subcategory: SubcategoryRef,
    pub price: Price,
    #[serde(rename = "EAN")]
    pub ean: Ean,
    /// Units available in stock.
    pub in_stock: i64,
    /// Image URLs, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// The primary image, if the product has any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock > 0
    }
}

/// A subcategory as listed under its parent category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category_id: CategoryId,
}

/// A top-level category with its subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}
