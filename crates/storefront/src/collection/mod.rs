//! Persisted product collections.
//!
//! A [`CollectionStore`] is an ordered sequence of [`Product`]s held in
//! memory and mirrored, as a JSON array, to a single key of a
//! [`DurableStore`](crate::storage::DurableStore). The cart and the wishlist
//! are both collection stores; [`Cart`] and [`Wishlist`] add the views
//! specific to each.
//!
//! # Mutation discipline
//!
//! Every mutation builds a candidate sequence from the current one, writes
//! the candidate to storage, and only then commits it in memory and pushes it
//! to subscribers. When the write fails the in-memory sequence is untouched,
//! nothing is pushed, and the failure is reported on the [`ErrorChannel`].
//! Storage failures never surface as errors to the caller.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cornershop_storefront::collection::{Cart, ErrorChannel};
//! use cornershop_storefront::storage::MemoryStore;
//!
//! let cart = Cart::open(Arc::new(MemoryStore::new()), ErrorChannel::new());
//! assert_eq!(cart.len(), 0);
//! assert!(cart.current_total().is_zero());
//! ```

mod cart;
mod errors;
mod wishlist;

pub use cart::{CART_KEY, Cart, CartLine};
pub use errors::{ErrorChannel, PersistError};
pub use wishlist::{Toggle, WISHLIST_KEY, Wishlist};

use std::sync::Arc;

use cornershop_core::{Product, ProductId};

use crate::reactive::{BehaviorSubject, Observable, ValueStream};
use crate::storage::{DurableStore, SharedStore};

/// Result of a mutation.
///
/// Failures have already been logged and published on the error channel by
/// the time an outcome is returned, so callers are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Storage accepted the new sequence and it is now the current one.
    Committed,
    /// Storage rejected the new sequence; nothing changed.
    RolledBack,
}

impl Outcome {
    /// Whether the mutation took effect.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

struct CollectionInner {
    key: String,
    store: SharedStore,
    errors: ErrorChannel,
    items: BehaviorSubject<Vec<Product>>,
}

/// An ordered product collection mirrored to durable storage.
///
/// Cloning is cheap and every clone refers to the same collection.
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<CollectionInner>,
}

impl CollectionStore {
    /// Load the collection stored under `key`.
    ///
    /// An absent key yields an empty collection. A key that cannot be read or
    /// does not hold a JSON array of products also yields an empty
    /// collection, and the failure is reported once on `errors`.
    pub fn open(key: impl Into<String>, store: SharedStore, errors: ErrorChannel) -> Self {
        let key = key.into();
        let initial = match load(&store, &key) {
            Ok(items) => {
                tracing::debug!(key = %key, count = items.len(), "Loaded collection");
                items
            }
            Err(err) => {
                errors.report(err);
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(CollectionInner {
                key,
                store,
                errors,
                items: BehaviorSubject::new(initial),
            }),
        }
    }

    /// Storage key this collection is mirrored to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Channel this collection reports persistence failures on.
    #[must_use]
    pub fn errors(&self) -> &ErrorChannel {
        &self.inner.errors
    }

    /// Add `entry` at the end of the collection.
    ///
    /// Entries with an id already present are added again; each copy counts
    /// separately.
    pub fn append(&self, entry: Product) -> Outcome {
        let product_id = entry.id;
        let result = self.inner.items.try_update(|current| {
            let mut candidate = Vec::with_capacity(current.len() + 1);
            candidate.extend_from_slice(current);
            candidate.push(entry);
            self.persist(&candidate)?;
            Ok(candidate)
        });
        self.settle(result, "append", product_id)
    }

    /// Remove every entry whose id equals `entry`'s id.
    pub fn remove_matching(&self, entry: &Product) -> Outcome {
        self.remove_id(entry.id)
    }

    /// Remove every entry with the given id.
    ///
    /// The collection is rewritten even when no entry matches.
    pub fn remove_id(&self, id: ProductId) -> Outcome {
        let result = self.inner.items.try_update(|current| {
            let candidate: Vec<Product> = current.iter().filter(|p| p.id != id).cloned().collect();
            self.persist(&candidate)?;
            Ok(candidate)
        });
        self.settle(result, "remove", id)
    }

    /// Remove every entry.
    pub fn clear(&self) -> Outcome {
        let result = self.inner.items.try_update(|_| {
            let candidate: Vec<Product> = Vec::new();
            self.persist(&candidate)?;
            Ok(candidate)
        });
        match result {
            Ok(()) => {
                tracing::debug!(key = %self.inner.key, "Cleared collection");
                Outcome::Committed
            }
            Err(err) => {
                self.inner.errors.report(err);
                Outcome::RolledBack
            }
        }
    }

    /// Whether any entry has the given id.
    #[must_use]
    pub fn contains_id(&self, id: ProductId) -> bool {
        self.inner
            .items
            .with_value(|items| items.iter().any(|p| p.id == id))
    }

    /// The current sequence, then every committed replacement.
    #[must_use]
    pub fn items(&self) -> ValueStream<Vec<Product>> {
        self.inner.items.as_stream()
    }

    /// Number of entries, re-emitted on every committed change.
    #[must_use]
    pub fn count(&self) -> impl Observable<Item = usize> + Clone + use<> {
        self.items().map(Vec::len)
    }

    /// Whether an entry with `id` is present, re-emitted on every committed
    /// change.
    #[must_use]
    pub fn membership(&self, id: ProductId) -> impl Observable<Item = bool> + Clone + use<> {
        self.items()
            .map(move |items: &Vec<Product>| items.iter().any(|p| p.id == id))
    }

    /// A copy of the current sequence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Product> {
        self.inner.items.value()
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.with_value(Vec::len)
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, candidate: &[Product]) -> Result<(), PersistError> {
        let key = &self.inner.key;
        let json = serde_json::to_string(candidate).map_err(|source| PersistError::Encode {
            key: key.clone(),
            source,
        })?;
        self.inner
            .store
            .set(key, &json)
            .map_err(|source| PersistError::Write {
                key: key.clone(),
                source,
            })
    }

    fn settle(
        &self,
        result: Result<(), PersistError>,
        operation: &'static str,
        product_id: ProductId,
    ) -> Outcome {
        match result {
            Ok(()) => {
                tracing::debug!(
                    key = %self.inner.key,
                    operation,
                    product_id = %product_id,
                    "Collection updated"
                );
                Outcome::Committed
            }
            Err(err) => {
                self.inner.errors.report(err);
                Outcome::RolledBack
            }
        }
    }
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("key", &self.inner.key)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Read and decode the sequence stored under `key`.
///
/// An absent key, an empty value, and a JSON `null` all decode to an empty
/// sequence.
fn load(store: &SharedStore, key: &str) -> Result<Vec<Product>, PersistError> {
    let raw = store.get(key).map_err(|source| PersistError::Read {
        key: key.to_string(),
        source,
    })?;

    match raw.as_deref() {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str::<Option<Vec<Product>>>(raw)
            .map(Option::unwrap_or_default)
            .map_err(|source| PersistError::Malformed {
                key: key.to_string(),
                source,
            }),
    }
}
