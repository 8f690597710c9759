//! The fixture catalog: five products in three categories.

use std::path::PathBuf;
use std::time::Duration;

use cornershop_core::{
    Category, CategoryId, CategoryRef, Ean, Price, Product, ProductId, Subcategory, SubcategoryId,
    SubcategoryRef,
};
use cornershop_storefront::config::{CatalogConfig, StorefrontConfig};
use secrecy::SecretString;
use url::Url;

const CATEGORIES: [(i64, &str); 3] = [(1, "Electronics"), (2, "Clothing"), (3, "Home & Garden")];

/// (id, name, category id)
const SUBCATEGORIES: [(i64, &str, i64); 6] = [
    (1, "Smartphones", 1),
    (2, "Laptops", 1),
    (3, "T-Shirts", 2),
    (4, "Jeans", 2),
    (5, "Furniture", 3),
    (6, "Tools", 3),
];

struct Row {
    id: i64,
    name: &'static str,
    description: &'static str,
    subcategory_id: i64,
    cents: i64,
    in_stock: i64,
    image: &'static str,
}

const PRODUCTS: [Row; 5] = [
    Row {
        id: 1,
        name: "iPhone 13 Pro",
        description: "Latest Apple smartphone with A15 Bionic chip",
        subcategory_id: 1,
        cents: 99_999,
        in_stock: 50,
        image: "iphone13pro.jpg",
    },
    Row {
        id: 2,
        name: "MacBook Pro 16\"",
        description: "Powerful laptop for professionals",
        subcategory_id: 2,
        cents: 249_999,
        in_stock: 25,
        image: "macbookpro.jpg",
    },
    Row {
        id: 3,
        name: "Cotton T-Shirt",
        description: "Comfortable cotton t-shirt",
        subcategory_id: 3,
        cents: 1_999,
        in_stock: 100,
        image: "tshirt.jpg",
    },
    Row {
        id: 4,
        name: "Designer Jeans",
        description: "Premium denim jeans",
        subcategory_id: 4,
        cents: 7_999,
        in_stock: 75,
        image: "jeans.jpg",
    },
    Row {
        id: 5,
        name: "Office Chair",
        description: "Ergonomic office chair with lumbar support",
        subcategory_id: 5,
        cents: 29_999,
        in_stock: 30,
        image: "chair.jpg",
    },
];

fn category_name(id: i64) -> String {
    CATEGORIES
        .iter()
        .find(|(category_id, _)| *category_id == id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_default()
}

fn to_product(row: &Row) -> Product {
    let (_, subcategory_name, category_id) = SUBCATEGORIES
        .iter()
        .copied()
        .find(|(id, _, _)| *id == row.subcategory_id)
        .unwrap_or((row.subcategory_id, "", 0));

    Product {
        id: ProductId::new(row.id),
        name: row.name.to_string(),
        description: row.description.to_string(),
        category_id: CategoryId::new(category_id),
        subcategory_id: SubcategoryId::new(row.subcategory_id),
        category: CategoryRef {
            id: CategoryId::new(category_id),
            name: category_name(category_id),
        },
        subcategory: SubcategoryRef {
            id: SubcategoryId::new(row.subcategory_id),
            name: subcategory_name.to_string(),
        },
        price: Price::from_cents(row.cents).unwrap_or(Price::ZERO),
        ean: Ean::new(1_234_567_890_122 + row.id.unsigned_abs()),
        in_stock: row.in_stock,
        images: vec![row.image.to_string()],
    }
}

/// Every fixture product, ordered by id.
#[must_use]
pub fn products() -> Vec<Product> {
    PRODUCTS.iter().map(to_product).collect()
}

/// The fixture product with this id.
#[must_use]
pub fn product(id: i64) -> Option<Product> {
    PRODUCTS.iter().find(|row| row.id == id).map(to_product)
}

/// Every fixture category with its subcategories.
#[must_use]
pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|&(id, name)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            subcategories: SUBCATEGORIES
                .iter()
                .filter(|(_, _, category_id)| *category_id == id)
                .map(|&(sub_id, sub_name, category_id)| Subcategory {
                    id: SubcategoryId::new(sub_id),
                    name: sub_name.to_string(),
                    category_id: CategoryId::new(category_id),
                })
                .collect(),
        })
        .collect()
}

/// Catalog settings pointing at `url`.
#[must_use]
pub fn catalog_config(url: Url, admin_secret: Option<&str>) -> CatalogConfig {
    CatalogConfig {
        graphql_url: url,
        admin_secret: admin_secret.map(|s| SecretString::from(s.to_string())),
        cache_ttl: Duration::from_secs(60),
        cache_capacity: 100,
    }
}

/// Storefront settings with an optional catalog.
#[must_use]
pub fn storefront_config(
    data_dir: impl Into<PathBuf>,
    catalog: Option<CatalogConfig>,
) -> StorefrontConfig {
    StorefrontConfig {
        data_dir: data_dir.into(),
        catalog,
        sentry_dsn: None,
    }
}
