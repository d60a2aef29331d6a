//! Product categories.
//!
//! Categories are read-only reference data: fetched once per session and
//! matched by slug.

use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier used for matching and filtering.
    pub slug: String,
    /// Display label.
    pub name: String,
    /// Informational listing URL.
    pub url: String,
}

impl Category {
    /// Build a category record from a bare label.
    ///
    /// Older catalog servers return categories as plain strings. The slug is
    /// the slug-cased label, the name its title-cased form, and the URL points
    /// at the category listing under `base_url`.
    #[must_use]
    pub fn from_label(label: &str, base_url: &str) -> Self {
        let slug = slugify(label);
        Self {
            name: title_case(&slug),
            url: format!(
                "{}/products/category/{slug}",
                base_url.trim_end_matches('/')
            ),
            slug,
        }
    }
}

/// Slug-case a label: lowercase alphanumerics (Unicode included) separated
/// by single hyphens.
///
/// ```
/// use vitrine_core::slugify;
///
/// assert_eq!(slugify("Mens Shirts"), "mens-shirts");
/// assert_eq!(slugify("  home_decoration "), "home-decoration");
/// ```
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;

    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Title-case a label, treating hyphens, underscores and whitespace as word
/// breaks.
///
/// ```
/// use vitrine_core::title_case;
///
/// assert_eq!(title_case("red"), "Red");
/// assert_eq!(title_case("womens-bags"), "Womens Bags");
/// ```
#[must_use]
pub fn title_case(label: &str) -> String {
    label
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
