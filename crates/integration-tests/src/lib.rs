//! Integration tests for the Corner Shop storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cornershop-integration-tests
//! ```
//!
//! No external services are needed: catalog tests talk to a
//! [`FakeCatalog`](fake_catalog::FakeCatalog) served in-process on a random
//! local port, and persistence tests use temporary directories.
//!
//! # Test Categories
//!
//! - `catalog` - Catalog client against the fake backend
//! - `cart` - Cart flows through `AppState`, in memory and on disk
//! - `wishlist` - Wishlist flows and moving saved products to the cart

pub mod fake_catalog;
pub mod fixtures;
