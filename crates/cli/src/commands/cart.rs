//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! shop cart add 4 --quantity 2
//! shop cart remove 4
//! shop cart list
//! shop cart total
//! shop cart clear
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use cornershop_core::{Price, ProductId};
use cornershop_storefront::collection::Outcome;
use cornershop_storefront::error::{AppError, Result};
use cornershop_storefront::reactive::Observable;
use cornershop_storefront::state::AppState;
use cornershop_storefront::subscriptions::SubscriptionContainer;

use super::output;

/// Latest cart count and total, kept current by subscriptions for as long
/// as the watcher lives.
struct CartSummary {
    latest: Arc<Mutex<(usize, Price)>>,
    _subscriptions: SubscriptionContainer,
}

impl CartSummary {
    fn watch(state: &AppState) -> Self {
        let latest = Arc::new(Mutex::new((0, Price::ZERO)));
        let mut subscriptions = SubscriptionContainer::new();

        let sink = Arc::clone(&latest);
        subscriptions.add(state.cart().count().subscribe(move |count: &usize| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).0 = *count;
        }));
        let sink = Arc::clone(&latest);
        subscriptions.add(state.cart().total().subscribe(move |total: &Price| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).1 = *total;
        }));

        Self {
            latest,
            _subscriptions: subscriptions,
        }
    }

    fn line(&self) -> String {
        let (count, total) = *self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let noun = if count == 1 { "item" } else { "items" };
        format!("Cart: {count} {noun}, total {total}")
    }
}

/// Turn a rolled-back mutation into a command failure.
pub fn committed(outcome: Outcome, what: &str) -> Result<()> {
    match outcome {
        Outcome::Committed => Ok(()),
        Outcome::RolledBack => Err(AppError::Internal(format!(
            "{what} could not be saved; see the log for details"
        ))),
    }
}

/// Show cart lines and the total.
pub fn list(state: &AppState) {
    let cart = state.cart();
    if cart.is_empty() {
        output::emit_line("Your cart is empty.");
        return;
    }
    output::emit(&output::cart_table(
        &cart.current_lines(),
        cart.current_total(),
    ));
}

/// Add `quantity` copies of a product.
pub async fn add(state: &AppState, id: ProductId, quantity: u32) -> Result<()> {
    let summary = CartSummary::watch(state);
    committed(state.add_to_cart(id, quantity).await?, "Cart")?;
    tracing::info!(product_id = %id, quantity, "Added to cart");
    output::emit_line(&summary.line());
    Ok(())
}

/// Remove every copy of a product.
pub fn remove(state: &AppState, id: ProductId) -> Result<()> {
    let summary = CartSummary::watch(state);
    committed(state.remove_from_cart(id)?, "Cart")?;
    tracing::info!(product_id = %id, "Removed from cart");
    output::emit_line(&summary.line());
    Ok(())
}

/// Show the cart total.
pub fn total(state: &AppState) {
    output::emit_line(&CartSummary::watch(state).line());
}

/// Remove every entry.
pub fn clear(state: &AppState) -> Result<()> {
    committed(state.cart().clear(), "Cart")?;
    output::emit_line("Cart cleared.");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use cornershop_core::{CategoryId, CategoryRef, Ean, Product, SubcategoryId, SubcategoryRef};
    use cornershop_storefront::collection::ErrorChannel;
    use cornershop_storefront::config::StorefrontConfig;
    use cornershop_storefront::storage::MemoryStore;

    use super::*;

    fn state() -> AppState {
        let config = StorefrontConfig {
            data_dir: PathBuf::from("unused"),
            catalog: None,
            sentry_dsn: None,
        };
        AppState::with_store(config, Arc::new(MemoryStore::new()), ErrorChannel::new())
    }

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            category_id: CategoryId::new(1),
            subcategory_id: SubcategoryId::new(1),
            category: CategoryRef {
                id: CategoryId::new(1),
                name: "Electronics".to_string(),
            },
            subcategory: SubcategoryRef {
                id: SubcategoryId::new(1),
                name: "Smartphones".to_string(),
            },
            price: Price::from_cents(cents).unwrap(),
            ean: Ean::new(1_234_567_890_123),
            in_stock: 1,
            images: vec![],
        }
    }

    #[test]
    fn test_summary_follows_cart() {
        let state = state();
        let summary = CartSummary::watch(&state);
        assert_eq!(summary.line(), "Cart: 0 items, total $0.00");

        state.cart().append(product(1, 1999));
        assert_eq!(summary.line(), "Cart: 1 item, total $19.99");

        state.cart().append(product(2, 7999));
        assert_eq!(summary.line(), "Cart: 2 items, total $99.98");
    }

    #[test]
    fn test_rolled_back_is_error() {
        assert!(committed(Outcome::Committed, "Cart").is_ok());
        let err = committed(Outcome::RolledBack, "Cart").unwrap_err();
        assert!(err.to_string().contains("Cart could not be saved"));
    }
}
