//! Wishlist commands.
//!
//! # Usage
//!
//! ```bash
//! shop wishlist add 5
//! shop wishlist toggle 5
//! shop wishlist to-cart 5
//! shop wishlist list
//! ```

use cornershop_core::ProductId;
use cornershop_storefront::collection::Toggle;
use cornershop_storefront::error::{AppError, Result};
use cornershop_storefront::state::AppState;

use super::cart::committed;
use super::output;

/// Show saved products.
pub fn list(state: &AppState) {
    let saved = state.wishlist().snapshot();
    if saved.is_empty() {
        output::emit_line("Your wishlist is empty.");
        return;
    }
    output::emit(&output::product_table(&saved));
}

/// Save a product unless it is already saved.
pub async fn add(state: &AppState, id: ProductId) -> Result<()> {
    match state.add_to_wishlist(id).await? {
        None => output::emit_line(&format!("Product {id} is already in your wishlist.")),
        Some(outcome) => {
            committed(outcome, "Wishlist")?;
            tracing::info!(product_id = %id, "Saved to wishlist");
            output::emit_line(&format!("Saved product {id} to your wishlist."));
        }
    }
    Ok(())
}

/// Remove a saved product.
pub fn remove(state: &AppState, id: ProductId) -> Result<()> {
    committed(state.remove_from_wishlist(id)?, "Wishlist")?;
    output::emit_line(&format!("Removed product {id} from your wishlist."));
    Ok(())
}

/// Save a product, or remove it if it is already saved.
pub async fn toggle(state: &AppState, id: ProductId) -> Result<()> {
    let message = match state.toggle_wishlist(id).await? {
        Toggle::Added => format!("Saved product {id} to your wishlist."),
        Toggle::Removed => format!("Removed product {id} from your wishlist."),
        Toggle::Unchanged => {
            return Err(AppError::Internal(
                "Wishlist could not be saved; see the log for details".to_string(),
            ));
        }
    };
    output::emit_line(&message);
    Ok(())
}

/// Add a saved product to the cart. The product stays saved.
pub fn to_cart(state: &AppState, id: ProductId) -> Result<()> {
    committed(state.wishlist_to_cart(id)?, "Cart")?;
    tracing::info!(product_id = %id, "Added saved product to cart");
    output::emit_line(&format!(
        "Added product {id} to your cart ({} in cart).",
        state.cart().len()
    ));
    Ok(())
}
