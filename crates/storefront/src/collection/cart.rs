//! The shopping cart.

use std::collections::HashMap;
use std::ops::Deref;

use cornershop_core::{Price, Product, ProductId};

use super::{CollectionStore, ErrorChannel};
use crate::reactive::Observable;
use crate::storage::SharedStore;

/// Storage key of the cart.
pub const CART_KEY: &str = "cart";

/// The cart: a product collection with a running total.
///
/// Adding a product twice means a quantity of two. Removing a product
/// removes every copy of it.
#[derive(Clone, Debug)]
pub struct Cart {
    collection: CollectionStore,
}

impl Cart {
    /// Load the cart from `store`.
    pub fn open(store: SharedStore, errors: ErrorChannel) -> Self {
        Self {
            collection: CollectionStore::open(CART_KEY, store, errors),
        }
    }

    /// Sum of all entry prices, re-emitted on every committed change.
    #[must_use]
    pub fn total(&self) -> impl Observable<Item = Price> + Clone + use<> {
        self.collection
            .items()
            .map(|items: &Vec<Product>| total_of(items))
    }

    /// Sum of all entry prices right now.
    #[must_use]
    pub fn current_total(&self) -> Price {
        total_of(&self.collection.snapshot())
    }

    /// Entries grouped by product, re-emitted on every committed change.
    #[must_use]
    pub fn lines(&self) -> impl Observable<Item = Vec<CartLine>> + Clone + use<> {
        self.collection
            .items()
            .map(|items: &Vec<Product>| group_lines(items))
    }

    /// Entries grouped by product right now.
    #[must_use]
    pub fn current_lines(&self) -> Vec<CartLine> {
        group_lines(&self.collection.snapshot())
    }
}

impl Deref for Cart {
    type Target = CollectionStore;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

/// One product in the cart with the number of copies added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

fn total_of(items: &[Product]) -> Price {
    items.iter().map(|p| p.price).sum()
}

/// Group entries by id, in order of first appearance. Each line carries the
/// first copy's product data.
fn group_lines(items: &[Product]) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::new();
    let mut positions: HashMap<ProductId, usize> = HashMap::new();

    for product in items {
        match positions.get(&product.id).and_then(|&i| lines.get_mut(i)) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => {
                positions.insert(product.id, lines.len());
                lines.push(CartLine {
                    product: product.clone(),
                    quantity: 1,
                });
            }
        }
    }

    lines
}
