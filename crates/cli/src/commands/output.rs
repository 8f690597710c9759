//! Plain-text rendering of products, cart lines and categories.

use std::fmt::Write as _;

use cornershop_core::{Category, Price, Product};
use cornershop_storefront::collection::CartLine;

/// One line per product: id, name, price, category and stock.
pub fn product_table(products: &[Product]) -> String {
    let mut out = String::new();
    for p in products {
        let _ = writeln!(
            out,
            "{:>5}  {:<32} {:>10}  {} / {}  ({} in stock)",
            p.id, p.name, p.price, p.category.name, p.subcategory.name, p.in_stock
        );
    }
    out
}

/// Full description of a single product.
pub fn product_details(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", product.name, product.id);
    let _ = writeln!(out, "  Price:    {}", product.price);
    let _ = writeln!(
        out,
        "  Category: {} / {}",
        product.category.name, product.subcategory.name
    );
    let _ = writeln!(out, "  EAN:      {}", product.ean);
    let _ = writeln!(out, "  In stock: {}", product.in_stock);
    if let Some(image) = product.primary_image() {
        let _ = writeln!(out, "  Image:    {image}");
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n  {}", product.description);
    }
    out
}

/// Cart lines with quantities, line totals and the grand total.
pub fn cart_table(lines: &[CartLine], total: Price) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{:>5}  {:<32} {:>3} x {:>10} = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total()
        );
    }
    let _ = writeln!(out, "{:>66}", format!("Total: {total}"));
    out
}

/// Categories with their subcategories indented below.
pub fn category_tree(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{}", category.name);
        for sub in &category.subcategories {
            let _ = writeln!(out, "  - {}", sub.name);
        }
    }
    out
}

/// Write `text` to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    print!("{text}");
}

/// Write a single line to stdout.
#[allow(clippy::print_stdout)]
pub fn emit_line(text: &str) {
    println!("{text}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cornershop_core::{
        CategoryId, CategoryRef, Ean, ProductId, Subcategory, SubcategoryId, SubcategoryRef,
    };

    use super::*;

    fn jeans() -> Product {
        Product {
            id: ProductId::new(4),
            name: "Designer Jeans".to_string(),
            description: "Premium denim jeans".to_string(),
            category_id: CategoryId::new(2),
            subcategory_id: SubcategoryId::new(4),
            category: CategoryRef {
                id: CategoryId::new(2),
                name: "Clothing".to_string(),
            },
            subcategory: SubcategoryRef {
                id: SubcategoryId::new(4),
                name: "Jeans".to_string(),
            },
            price: Price::from_cents(7999).unwrap(),
            ean: Ean::new(1_234_567_890_126),
            in_stock: 75,
            images: vec!["jeans.jpg".to_string()],
        }
    }

    #[test]
    fn test_product_table_row() {
        let table = product_table(&[jeans()]);
        assert!(table.contains("Designer Jeans"));
        assert!(table.contains("$79.99"));
        assert!(table.contains("Clothing / Jeans"));
        assert_eq!(table.lines().count(), 1);
    }

    #[test]
    fn test_product_details() {
        let details = product_details(&jeans());
        assert!(details.starts_with("Designer Jeans (#4)"));
        assert!(details.contains("EAN:      1234567890126"));
        assert!(details.contains("Image:    jeans.jpg"));
    }

    #[test]
    fn test_cart_table_total() {
        let line = CartLine {
            product: jeans(),
            quantity: 2,
        };
        let table = cart_table(&[line], Price::from_cents(15998).unwrap());
        assert!(table.contains("2 x     $79.99 =    $159.98"));
        assert!(table.trim_end().ends_with("Total: $159.98"));
    }

    #[test]
    fn test_category_tree() {
        let categories = vec![Category {
            id: CategoryId::new(2),
            name: "Clothing".to_string(),
            subcategories: vec![Subcategory {
                id: SubcategoryId::new(3),
                name: "T-Shirts".to_string(),
                category_id: CategoryId::new(2),
            }],
        }];
        assert_eq!(category_tree(&categories), "Clothing\n  - T-Shirts\n");
    }
}
