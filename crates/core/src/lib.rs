//! Corner Shop Core - Shared types library.
//!
//! This crate provides the domain types used across all Corner Shop components:
//! - `storefront` - Client state layer (cart, wishlist, catalog client)
//! - `cli` - Command-line storefront shell
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, EAN codes, products and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
