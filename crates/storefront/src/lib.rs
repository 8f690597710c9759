//! Corner Shop storefront library.
//!
//! Client-side state for the storefront: the cart and wishlist, persisted
//! to durable key-value storage and published as observable streams, plus
//! a cached client for the GraphQL product catalog.
//!
//! # Modules
//!
//! - [`storage`] - durable string key-value stores
//! - [`reactive`] - subjects, derived streams and subscription handles
//! - [`collection`] - the persisted cart and wishlist
//! - [`subscriptions`] - releasing groups of subscriptions together
//! - [`catalog`] - catalog queries and the category announcement channel
//! - [`state`] - everything above wired together for one session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod reactive;
pub mod state;
pub mod storage;
pub mod subscriptions;
