//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! shop products list --category Clothing --sort desc
//! shop products search "office"
//! shop products price 10 100
//! shop products get 1
//! shop products filter Jeans T-Shirts
//! shop products suggested
//! shop categories
//! ```

use cornershop_core::{Price, Product, ProductId};
use cornershop_storefront::catalog::PriceOrder;
use cornershop_storefront::error::{AppError, Result};
use cornershop_storefront::state::AppState;

use super::output;

fn show(products: &[Product]) {
    if products.is_empty() {
        output::emit_line("No products found.");
    } else {
        output::emit(&output::product_table(products));
    }
}

/// List products, optionally by category and ordered by price.
pub async fn list(
    state: &AppState,
    order: Option<PriceOrder>,
    category: Option<&str>,
) -> Result<()> {
    let products = state.catalog()?.products(order, category).await?;
    if let Some(category) = category {
        state.category_filter().set(category);
    }
    show(&products);
    Ok(())
}

/// Products whose name contains `text`.
pub async fn search(state: &AppState, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("search text is empty".to_string()));
    }
    show(&state.catalog()?.search_products(text).await?);
    Ok(())
}

/// Products priced within `from..=to`.
pub async fn by_price(state: &AppState, from: Price, to: Price) -> Result<()> {
    if from > to {
        return Err(AppError::BadRequest(format!(
            "lowest price {from} is above highest price {to}"
        )));
    }
    show(&state.catalog()?.products_by_price(from, to).await?);
    Ok(())
}

/// Show one product, marking whether it is in the cart or wishlist.
pub async fn get(state: &AppState, id: ProductId) -> Result<()> {
    let product = state
        .catalog()?
        .product_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

    output::emit(&output::product_details(&product));
    if state.cart().contains_id(id) {
        output::emit_line("  (in your cart)");
    }
    if state.wishlist().contains_id(id) {
        output::emit_line("  (in your wishlist)");
    }
    Ok(())
}

/// Products in any of the named subcategories.
pub async fn filter(state: &AppState, subcategories: &[String]) -> Result<()> {
    show(&state.catalog()?.filtered_products(subcategories).await?);
    Ok(())
}

/// Suggested products.
pub async fn suggested(state: &AppState) -> Result<()> {
    show(&state.catalog()?.suggested_products().await?);
    Ok(())
}

/// Categories and their subcategories.
pub async fn categories(state: &AppState) -> Result<()> {
    let categories = state.catalog()?.product_categories().await?;
    output::emit(&output::category_tree(&categories));
    Ok(())
}
