//! CLI command implementations.

pub mod cart;
pub mod products;
pub mod wishlist;

mod output;
