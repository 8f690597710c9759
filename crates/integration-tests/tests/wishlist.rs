//! Wishlist flows and moving saved products to the cart.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use cornershop_core::{Price, ProductId};
use cornershop_integration_tests::fake_catalog::FakeCatalog;
use cornershop_integration_tests::fixtures;
use cornershop_storefront::collection::{ErrorChannel, Toggle};
use cornershop_storefront::reactive::Observable;
use cornershop_storefront::state::AppState;
use cornershop_storefront::storage::MemoryStore;

async fn online_state() -> (FakeCatalog, AppState) {
    let (fake, url) = FakeCatalog::spawn().await.unwrap();
    let config =
        fixtures::storefront_config("unused", Some(fixtures::catalog_config(url, None)));
    let state = AppState::with_store(config, Arc::new(MemoryStore::new()), ErrorChannel::new());
    (fake, state)
}

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let (fake, state) = online_state().await;

    let membership = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&membership);
    let _sub = state
        .wishlist()
        .membership(ProductId::new(5))
        .subscribe(move |saved: &bool| sink.lock().unwrap().push(*saved));

    assert_eq!(state.toggle_wishlist(ProductId::new(5)).await.unwrap(), Toggle::Added);
    assert_eq!(state.toggle_wishlist(ProductId::new(5)).await.unwrap(), Toggle::Removed);

    assert!(state.wishlist().is_empty());
    assert_eq!(*membership.lock().unwrap(), vec![false, true, false]);
    // The saved copy is used for removal
    assert_eq!(fake.operations(), vec!["GetProductById"]);
}

#[tokio::test]
async fn test_add_twice_keeps_one_entry() {
    let (_fake, state) = online_state().await;

    assert!(state.add_to_wishlist(ProductId::new(2)).await.unwrap().is_some());
    assert!(state.add_to_wishlist(ProductId::new(2)).await.unwrap().is_none());

    assert_eq!(state.wishlist().len(), 1);
}

#[tokio::test]
async fn test_saved_product_moves_to_cart_and_stays_saved() {
    let (_fake, state) = online_state().await;
    state.add_to_wishlist(ProductId::new(4)).await.unwrap();

    state.wishlist_to_cart(ProductId::new(4)).unwrap();
    state.wishlist_to_cart(ProductId::new(4)).unwrap();

    assert_eq!(state.cart().len(), 2);
    assert!(state.wishlist().contains_id(ProductId::new(4)));
    assert_eq!(state.cart().current_total(), "159.98".parse::<Price>().unwrap());
}

#[tokio::test]
async fn test_count_follows_wishlist() {
    let (_fake, state) = online_state().await;
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let _sub = state
        .wishlist()
        .count()
        .subscribe(move |n: &usize| sink.lock().unwrap().push(*n));

    state.add_to_wishlist(ProductId::new(1)).await.unwrap();
    state.add_to_wishlist(ProductId::new(3)).await.unwrap();
    state.remove_from_wishlist(ProductId::new(1)).unwrap();

    assert_eq!(*counts.lock().unwrap(), vec![0, 1, 2, 1]);
}

#[test]
fn test_wishlist_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let state = AppState::new(fixtures::storefront_config(dir.path(), None)).unwrap();
        state.wishlist().toggle(fixtures::product(5).unwrap());
    }

    let state = AppState::new(fixtures::storefront_config(dir.path(), None)).unwrap();
    assert!(state.wishlist().contains_id(ProductId::new(5)));
    assert!(state.cart().is_empty());
}
