//! JSON shapes exchanged with the catalog service and their conversion to
//! core types.
//!
//! Everything the service sends is read leniently here and normalized into
//! a single shape, so nothing past this module branches on response shape.

use serde::{Deserialize, Serialize};
use vitrine_core::{Category, Price, Product, ProductDraft, ProductId, ProductPage, slugify, title_case};

// =============================================================================
// Responses
// =============================================================================

/// `GET /products`, `/products/search` and `/products/category/{slug}`.
#[derive(Debug, Deserialize)]
pub(super) struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<WireProduct>,
    #[serde(default)]
    pub total: u64,
}

impl ProductListResponse {
    /// Convert to a page, dropping records that lack an id, title or price.
    pub fn into_page(self) -> ProductPage {
        let products = self
            .products
            .into_iter()
            .filter_map(|raw| match raw.into_product() {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed product in listing");
                    None
                }
            })
            .collect();

        ProductPage {
            products,
            total: self.total,
        }
    }
}

/// A category as sent by the service: either a bare label (legacy servers)
/// or a full record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum WireCategory {
    Label(String),
    Record {
        slug: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl WireCategory {
    /// Normalize into a full category record.
    pub fn normalize(self, base_url: &str) -> Category {
        match self {
            Self::Label(label) => Category::from_label(&label, base_url),
            Self::Record { slug, name, url } => {
                let fallback = Category::from_label(&slug, base_url);
                Category {
                    name: name
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| title_case(&slug)),
                    url: url.unwrap_or(fallback.url),
                    slug,
                }
            }
        }
    }

    /// The category slug this value refers to.
    pub fn into_slug(self) -> String {
        match self {
            Self::Label(label) => slugify(&label),
            Self::Record { slug, .. } => slug,
        }
    }
}

/// A product record with every field optional.
///
/// Write responses may echo only part of the record, and list responses
/// carry many fields the client ignores.
#[derive(Debug, Default, Deserialize)]
pub(super) struct WireProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<WireCategory>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl WireProduct {
    /// Convert a read response into a product.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the id, title or price is missing.
    pub fn into_product(self) -> Result<Product, serde_json::Error> {
        use serde::de::Error as _;

        let id = self
            .id
            .ok_or_else(|| serde_json::Error::missing_field("id"))?;
        let title = self
            .title
            .ok_or_else(|| serde_json::Error::missing_field("title"))?;
        let price = self
            .price
            .ok_or_else(|| serde_json::Error::missing_field("price"))?;

        Ok(Product {
            id,
            title,
            price,
            description: self.description.unwrap_or_default(),
            category: self
                .category
                .map(WireCategory::into_slug)
                .unwrap_or_default(),
            images: images_or_thumbnail(self.images, self.thumbnail),
        })
    }

    /// Merge a write response over the product that was sent.
    ///
    /// Fields the server omitted keep their sent values; the id is taken
    /// from the response when present.
    pub fn merge_over(self, sent: Product) -> Product {
        Product {
            id: self.id.unwrap_or(sent.id),
            title: self.title.unwrap_or(sent.title),
            price: self.price.unwrap_or(sent.price),
            description: self.description.unwrap_or(sent.description),
            category: self
                .category
                .map_or(sent.category, WireCategory::into_slug),
            images: self.images.unwrap_or(sent.images),
        }
    }
}

fn images_or_thumbnail(images: Option<Vec<String>>, thumbnail: Option<String>) -> Vec<String> {
    match images {
        Some(images) if !images.is_empty() => images,
        _ => thumbnail.into_iter().collect(),
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /products/add` and `PUT /products/{id}`.
#[derive(Debug, Serialize)]
pub(super) struct ProductPayload<'a> {
    pub title: &'a str,
    pub price: Price,
    pub description: &'a str,
    /// Category slug.
    pub category: &'a str,
    pub images: &'a [String],
}

impl<'a> From<&'a ProductDraft> for ProductPayload<'a> {
    fn from(draft: &'a ProductDraft) -> Self {
        Self {
            title: draft.title.trim(),
            price: draft.price,
            description: draft.description.trim(),
            category: draft.category.trim(),
            images: &draft.images,
        }
    }
}
