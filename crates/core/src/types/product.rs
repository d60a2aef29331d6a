//! Products, product drafts, and local validation.
//!
//! A [`ProductDraft`] is what gets sent to the catalog service on create and
//! update. It is validated locally before any network call; validation
//! failures are never retried.

use serde::{Deserialize, Serialize};
use url::Url;

use super::category::Category;
use super::id::ProductId;
use super::price::{Price, PriceError};

/// Errors raised by local validation of product input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The title is empty or whitespace.
    #[error("Title is required")]
    EmptyTitle,
    /// The title is too long.
    #[error("Title must be {max} characters or less")]
    TitleTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// No category was selected.
    #[error("Category is required")]
    MissingCategory,
    /// The category is not one of the known categories.
    #[error("Please select a valid category (unknown category '{0}')")]
    UnknownCategory(String),
    /// The price is missing, not numeric, or not positive.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
    /// The description is too long.
    #[error("Description must be {max} characters or less")]
    DescriptionTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// An image entry is not an absolute http(s) URL.
    #[error("Image URL is not a valid http(s) link: {0}")]
    InvalidImageUrl(String),
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID, assigned by the catalog service or synthesized locally.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Plain text description (empty when absent).
    #[serde(default)]
    pub description: String,
    /// Category slug.
    pub category: String,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Build a product from a draft and an assigned ID.
    #[must_use]
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            title: draft.title,
            price: draft.price,
            description: draft.description,
            category: draft.category,
            images: draft.images,
        }
    }

    /// The editable fields of this product as a draft.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            price: self.price,
            description: self.description.clone(),
            category: self.category.clone(),
            images: self.images.clone(),
        }
    }

    /// The first image, used as the listing thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The writable fields of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Product title (1-100 characters).
    pub title: String,
    /// Unit price (positive).
    pub price: Price,
    /// Description (at most 500 characters).
    #[serde(default)]
    pub description: String,
    /// Category slug (must be a known category).
    pub category: String,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Maximum title length in characters.
    pub const MAX_TITLE_LENGTH: usize = 100;
    /// Maximum description length in characters.
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;

    /// Validate the draft against the known category set.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates, checked in form order:
    /// title, category, price, description, images.
    pub fn validate(&self, categories: &[Category]) -> Result<(), ValidationError> {
        self.validate_identity(categories)?;

        if !self.price.is_positive() {
            return Err(ValidationError::InvalidPrice(PriceError::NotPositive));
        }

        if self.description.chars().count() > Self::MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::DescriptionTooLong {
                max: Self::MAX_DESCRIPTION_LENGTH,
            });
        }

        if let Some(bad) = self.images.iter().find(|image| !is_web_url(image)) {
            return Err(ValidationError::InvalidImageUrl(bad.clone()));
        }

        Ok(())
    }

    /// Title and category rules, the ones checked before the price.
    fn validate_identity(&self, categories: &[Category]) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.title.chars().count() > Self::MAX_TITLE_LENGTH {
            return Err(ValidationError::TitleTooLong {
                max: Self::MAX_TITLE_LENGTH,
            });
        }

        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if !categories.iter().any(|c| c.slug == self.category) {
            return Err(ValidationError::UnknownCategory(self.category.clone()));
        }

        Ok(())
    }
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// Raw product form input, as typed by a user.
///
/// All fields are strings; [`ProductForm::into_draft`] trims, parses and
/// validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    /// Selected category slug.
    pub category: String,
    /// A single image URL; blank means no images.
    pub image_url: String,
}

impl ProductForm {
    /// Pre-fill the form from an existing product (edit flow).
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.amount().to_string(),
            description: product.description.clone(),
            category: product.category.clone(),
            image_url: product.thumbnail().unwrap_or_default().to_string(),
        }
    }

    /// Convert the form into a validated draft.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if any field is invalid.
    pub fn into_draft(self, categories: &[Category]) -> Result<ProductDraft, ValidationError> {
        let image_url = self.image_url.trim();
        let images = if image_url.is_empty() {
            Vec::new()
        } else {
            vec![image_url.to_string()]
        };

        let mut draft = ProductDraft {
            title: self.title.trim().to_string(),
            price: Price::default(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            images,
        };

        // Title and category are reported before an unparsable price.
        match Price::parse(&self.price) {
            Ok(price) => draft.price = price,
            Err(price_error) => {
                return Err(draft
                    .validate_identity(categories)
                    .err()
                    .unwrap_or(ValidationError::InvalidPrice(price_error)));
            }
        }

        draft.validate(categories)?;
        Ok(draft)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::from_label("smartphones", "https://catalog.test"),
            Category::from_label("laptops", "https://catalog.test"),
        ]
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            title: "Phone X".to_string(),
            price: Price::new(Decimal::new(19999, 2)),
            description: String::new(),
            category: "smartphones".to_string(),
            images: vec![],
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate(&categories()).is_ok());
    }

    #[test]
    fn test_title_rules() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert_eq!(d.validate(&categories()), Err(ValidationError::EmptyTitle));

        d.title = "x".repeat(101);
        assert_eq!(
            d.validate(&categories()),
            Err(ValidationError::TitleTooLong { max: 100 })
        );

        d.title = "x".repeat(100);
        assert!(d.validate(&categories()).is_ok());
    }

    #[test]
    fn test_category_rules() {
        let mut d = draft();
        d.category = String::new();
        assert_eq!(
            d.validate(&categories()),
            Err(ValidationError::MissingCategory)
        );

        d.category = "shoes".to_string();
        assert_eq!(
            d.validate(&categories()),
            Err(ValidationError::UnknownCategory("shoes".to_string()))
        );

        // An empty known set rejects every category.
        d.category = "smartphones".to_string();
        assert!(matches!(
            d.validate(&[]),
            Err(ValidationError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_price_must_be_positive() {
        let mut d = draft();
        d.price = Price::new(Decimal::ZERO);
        assert_eq!(
            d.validate(&categories()),
            Err(ValidationError::InvalidPrice(PriceError::NotPositive))
        );
    }

    #[test]
    fn test_description_length() {
        let mut d = draft();
        d.description = "d".repeat(501);
        assert_eq!(
            d.validate(&categories()),
            Err(ValidationError::DescriptionTooLong { max: 500 })
        );
    }

    #[test]
    fn test_image_urls() {
        let mut d = draft();
        d.images = vec!["https://cdn.test/a.png".to_string()];
        assert!(d.validate(&categories()).is_ok());

        d.images = vec!["not a url".to_string()];
        assert!(matches!(
            d.validate(&categories()),
            Err(ValidationError::InvalidImageUrl(_))
        ));

        d.images = vec!["ftp://cdn.test/a.png".to_string()];
        assert!(matches!(
            d.validate(&categories()),
            Err(ValidationError::InvalidImageUrl(_))
        ));
    }

    #[test]
    fn test_form_into_draft() {
        let form = ProductForm {
            title: "  Phone X ".to_string(),
            price: "199.99".to_string(),
            description: " A phone ".to_string(),
            category: "smartphones".to_string(),
            image_url: String::new(),
        };
        let draft = form.into_draft(&categories()).unwrap();
        assert_eq!(draft.title, "Phone X");
        assert_eq!(draft.description, "A phone");
        assert!(draft.images.is_empty());
        assert_eq!(draft.price.amount(), Decimal::new(19999, 2));
    }

    #[test]
    fn test_form_price_errors() {
        let mut form = ProductForm {
            title: "Phone X".to_string(),
            category: "smartphones".to_string(),
            ..ProductForm::default()
        };
        assert_eq!(
            form.clone().into_draft(&categories()),
            Err(ValidationError::InvalidPrice(PriceError::Empty))
        );

        form.price = "cheap".to_string();
        assert_eq!(
            form.into_draft(&categories()),
            Err(ValidationError::InvalidPrice(PriceError::NotNumeric))
        );
    }

    #[test]
    fn test_form_reports_rules_in_form_order() {
        let form = ProductForm {
            title: "  ".to_string(),
            price: "cheap".to_string(),
            category: "shoes".to_string(),
            ..ProductForm::default()
        };
        assert_eq!(
            form.clone().into_draft(&categories()),
            Err(ValidationError::EmptyTitle)
        );

        let form = ProductForm {
            title: "Phone X".to_string(),
            ..form
        };
        assert_eq!(
            form.clone().into_draft(&categories()),
            Err(ValidationError::UnknownCategory("shoes".to_string()))
        );

        let form = ProductForm {
            price: "5".to_string(),
            category: "smartphones".to_string(),
            description: "d".repeat(501),
            ..form
        };
        assert_eq!(
            form.into_draft(&categories()),
            Err(ValidationError::DescriptionTooLong { max: 500 })
        );
    }

    #[test]
    fn test_form_round_trips_product() {
        let product = Product::from_draft(
            ProductId::new(3),
            ProductDraft {
                images: vec!["https://cdn.test/p.png".to_string()],
                ..draft()
            },
        );
        let form = ProductForm::from_product(&product);
        assert_eq!(form.image_url, "https://cdn.test/p.png");
        assert_eq!(form.price, "199.99");
        let back = form.into_draft(&categories()).unwrap();
        assert_eq!(back, product.to_draft());
    }

    #[test]
    fn test_product_deserializes_without_optional_fields() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "title": "Mascara", "price": 9.99, "category": "beauty"}"#,
        )
        .unwrap();
        assert!(product.description.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.thumbnail(), None);
    }
}
