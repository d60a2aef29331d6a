//! Derived, read-only views for presentation.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::types::{Category, Product};

/// The current page of products with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView<'a> {
    /// Products on the current page.
    pub page_items: Vec<&'a Product>,
    /// Current 1-based page.
    pub current_page: u32,
    /// `ceil(total / limit)`; zero when there are no matches.
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<'a> PageView<'a> {
    /// Derive the page view.
    ///
    /// `products` is the store's list for the current query, which the
    /// server has already windowed by `skip`/`limit`; locally-originated
    /// products are shown alongside it. `total` drives the page count.
    #[must_use]
    pub fn derive<I>(products: I, page: u32, limit: NonZeroU32, total: u64) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let total_pages = total.div_ceil(u64::from(limit.get()));
        let page_items = if total == 0 {
            Vec::new()
        } else {
            products.into_iter().collect()
        };

        Self {
            page_items,
            current_page: page,
            total_pages,
            has_previous: page > 1,
            has_next: u64::from(page) < total_pages,
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_items.is_empty()
    }
}

/// One entry of the category filter listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    /// Category slug; empty for "All Categories".
    pub slug: String,
    /// Display label.
    pub name: String,
    /// Whether this entry is the active filter.
    pub selected: bool,
}

impl CategoryOption {
    /// Label of the entry that clears the filter.
    pub const ALL_LABEL: &'static str = "All Categories";

    /// Build the category listing: "All Categories" first, then each
    /// category in server order.
    #[must_use]
    pub fn list(categories: &[Category], selected: &str) -> Vec<Self> {
        std::iter::once(Self {
            slug: String::new(),
            name: Self::ALL_LABEL.to_string(),
            selected: selected.is_empty(),
        })
        .chain(categories.iter().map(|category| Self {
            slug: category.slug.clone(),
            name: category.name.clone(),
            selected: category.slug == selected,
        }))
        .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{Price, ProductId};

    fn products(count: i64) -> Vec<Product> {
        (1..=count)
            .map(|id| Product {
                id: ProductId::new(id),
                title: format!("P{id}"),
                price: Price::new(Decimal::TEN),
                description: String::new(),
                category: "misc".to_string(),
                images: vec![],
            })
            .collect()
    }

    fn limit(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_first_page_of_twenty() {
        let items = products(6);
        let view = PageView::derive(&items, 1, limit(6), 20);
        assert_eq!(view.total_pages, 4);
        assert_eq!(view.page_items.len(), 6);
        assert_eq!(view.page_items[0].id, ProductId::new(1));
        assert_eq!(view.page_items[5].id, ProductId::new(6));
        assert!(!view.has_previous);
        assert!(view.has_next);
    }

    #[test]
    fn test_empty_total() {
        let view = PageView::derive(Vec::<&Product>::new(), 1, limit(6), 0);
        assert_eq!(view.total_pages, 0);
        assert!(view.is_empty());
        assert!(!view.has_next);
    }

    #[test]
    fn test_last_page() {
        let items = products(2);
        let view = PageView::derive(&items, 4, limit(6), 20);
        assert_eq!(view.total_pages, 4);
        assert!(view.has_previous);
        assert!(!view.has_next);
    }

    #[test]
    fn test_category_options() {
        let categories = vec![
            Category::from_label("red", "https://catalog.test"),
            Category::from_label("blue", "https://catalog.test"),
        ];

        let options = CategoryOption::list(&categories, "blue");
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].name, CategoryOption::ALL_LABEL);
        assert!(!options[0].selected);
        assert_eq!(options[2].name, "Blue");
        assert!(options[2].selected);

        let options = CategoryOption::list(&categories, "");
        assert!(options[0].selected);
        assert!(options.iter().skip(1).all(|o| !o.selected));
    }
}
