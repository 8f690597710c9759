//! The wishlist.

use std::ops::Deref;

use cornershop_core::Product;

use super::{CollectionStore, ErrorChannel, Outcome};
use crate::storage::SharedStore;

/// Storage key of the wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

/// What [`Wishlist::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Storage rejected the change; the wishlist is unchanged.
    Unchanged,
}

/// Products saved for later.
///
/// The collection itself accepts duplicates; [`Wishlist::toggle`] is the
/// add-or-remove policy the storefront uses so that a product appears at
/// most once.
#[derive(Clone, Debug)]
pub struct Wishlist {
    collection: CollectionStore,
}

impl Wishlist {
    /// Load the wishlist from `store`.
    pub fn open(store: SharedStore, errors: ErrorChannel) -> Self {
        Self {
            collection: CollectionStore::open(WISHLIST_KEY, store, errors),
        }
    }

    /// Remove `product` if it is present, add it otherwise.
    pub fn toggle(&self, product: Product) -> Toggle {
        if self.collection.contains_id(product.id) {
            match self.collection.remove_matching(&product) {
                Outcome::Committed => Toggle::Removed,
                Outcome::RolledBack => Toggle::Unchanged,
            }
        } else {
            match self.collection.append(product) {
                Outcome::Committed => Toggle::Added,
                Outcome::RolledBack => Toggle::Unchanged,
            }
        }
    }

    /// Add `product` unless it is already present.
    ///
    /// Returns `None` when the product was already saved.
    pub fn add_once(&self, product: Product) -> Option<Outcome> {
        if self.collection.contains_id(product.id) {
            return None;
        }
        Some(self.collection.append(product))
    }
}

impl Deref for Wishlist {
    type Target = CollectionStore;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collection::tests::product;
    use crate::storage::{DurableStore, MemoryStore};

    #[test]
    fn test_toggle_adds_then_removes() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = Wishlist::open(store.clone(), ErrorChannel::new());
        let item = product(9, 4999);

        assert_eq!(wishlist.toggle(item.clone()), Toggle::Added);
        assert!(wishlist.contains_id(item.id));
        assert_eq!(wishlist.toggle(item.clone()), Toggle::Removed);
        assert!(wishlist.is_empty());
        assert_eq!(store.get(WISHLIST_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_toggle_unchanged_when_storage_fails() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = Wishlist::open(store.clone(), ErrorChannel::new());
        store.set_available(false);

        assert_eq!(wishlist.toggle(product(1, 100)), Toggle::Unchanged);
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_add_once_skips_present_product() {
        let wishlist = Wishlist::open(Arc::new(MemoryStore::new()), ErrorChannel::new());

        assert_eq!(wishlist.add_once(product(3, 100)), Some(Outcome::Committed));
        assert_eq!(wishlist.add_once(product(3, 100)), None);
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_plain_append_allows_duplicates() {
        let wishlist = Wishlist::open(Arc::new(MemoryStore::new()), ErrorChannel::new());
        wishlist.append(product(3, 100));
        wishlist.append(product(3, 100));
        assert_eq!(wishlist.len(), 2);
    }
}
