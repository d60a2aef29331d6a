//! Plain-text rendering of store state.

use std::fmt::Write as _;

use vitrine_client::CatalogState;
use vitrine_client::store::CatalogEntry;
use vitrine_core::{CategoryOption, Product};

/// The current page, its position and any pending error.
pub fn page(state: &CatalogState) -> String {
    let view = state.view();
    let query = state.query();
    let mut out = String::new();

    if !query.category_filter().is_empty() {
        let _ = writeln!(out, "Category: {}", query.category_filter());
    } else if !query.search_term().trim().is_empty() {
        let _ = writeln!(out, "Search: {}", query.search_term().trim());
    }

    if view.is_empty() {
        out.push_str("No products found.");
    } else {
        let _ = writeln!(
            out,
            "Page {} of {} ({} products)",
            view.current_page,
            view.total_pages,
            state.total()
        );
        for entry in state.entries() {
            let product = entry.product();
            let marker = if entry.is_pending() { "*" } else { " " };
            let _ = writeln!(
                out,
                "{marker}{:>6}  {:<40}  {:>10}  {}",
                product.id,
                truncate(&product.title, 40),
                product.price.to_string(),
                product.category
            );
        }
        if state.entries().iter().any(CatalogEntry::is_pending) {
            out.push_str("* not yet confirmed by the catalog service\n");
        }
        let mut nav = Vec::new();
        if view.has_previous {
            nav.push(format!("--page {} for previous", view.current_page - 1));
        }
        if view.has_next {
            nav.push(format!("--page {} for next", view.current_page + 1));
        }
        out.push_str(&nav.join(", "));
    }

    if let Some(error) = &state.products_status().error {
        let _ = write!(out, "\n! {}", error.message);
    }
    out.trim_end().to_string()
}

/// The category listing with the active filter marked.
pub fn categories(options: &[CategoryOption]) -> String {
    options
        .iter()
        .map(|option| {
            let marker = if option.selected { ">" } else { " " };
            if option.slug.is_empty() {
                format!("{marker} {}", option.name)
            } else {
                format!("{marker} {:<24} {}", option.slug, option.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One product in full.
pub fn product(product: &Product) -> String {
    let mut out = format!(
        "#{} {}\nPrice:    {}\nCategory: {}",
        product.id, product.title, product.price, product.category
    );
    if !product.description.is_empty() {
        let _ = write!(out, "\n\n{}", product.description);
    }
    for image in &product.images {
        let _ = write!(out, "\nImage:    {image}");
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use vitrine_core::{Category, Price, ProductId};

    use super::*;

    fn lamp() -> Product {
        Product {
            id: ProductId::new(7),
            title: "Desk Lamp".to_string(),
            price: "24.5".parse::<Price>().unwrap_or_default(),
            description: "Warm light".to_string(),
            category: "home-decoration".to_string(),
            images: vec!["https://cdn.test/lamp.png".to_string()],
        }
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(page(&CatalogState::default()), "No products found.");
    }

    #[test]
    fn test_product_text() {
        let text = product(&lamp());
        assert!(text.starts_with("#7 Desk Lamp\nPrice:    $24.50"));
        assert!(text.contains("Warm light"));
        assert!(text.ends_with("Image:    https://cdn.test/lamp.png"));
    }

    #[test]
    fn test_category_listing_marks_selection() {
        let known = vec![Category::from_label("beauty", "https://catalog.test")];
        let text = categories(&CategoryOption::list(&known, "beauty"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "  All Categories");
        assert!(lines[1].starts_with("> beauty "));
        assert!(lines[1].ends_with(" Beauty"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
