//! Durable string key-value storage.
//!
//! The cart and wishlist mirror their contents into a [`DurableStore`] under a
//! single key each. The store is synchronous and string-valued, the same
//! contract a browser's local storage offers: reads may fail when storage is
//! unavailable, writes may additionally fail when a quota is exceeded, and a
//! stored value may be anything at all (including corrupted JSON).
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map with an optional byte quota; used in
//!   tests and for ephemeral sessions
//! - [`FileStore`] - one `<key>.json` file per key inside a data directory;
//!   survives process restarts

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use thiserror::Error;

/// Errors raised by a durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store cannot be accessed at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the store's capacity.
    #[error("storage quota exceeded: {requested} bytes requested, {limit} bytes allowed")]
    QuotaExceeded { requested: usize, limit: usize },

    /// Underlying filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Synchronous, string-keyed persistent storage.
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written or is full.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: DurableStore + ?Sized> DurableStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Shared handle to a durable store.
pub type SharedStore = Arc<dyn DurableStore>;
