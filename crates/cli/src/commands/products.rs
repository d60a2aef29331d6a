//! Product listing and editing commands.
//!
//! # Usage
//!
//! ```bash
//! vitrine list --category smartphones
//! vitrine show 12
//! vitrine create -t "Phone X" -p 199.99 -c smartphones
//! vitrine update 12 --price 149
//! vitrine delete 12
//! ```

use vitrine_client::{CatalogStore, ListOutcome, ProductLookup};
use vitrine_core::{Product, ProductForm, ProductId};

use super::{CommandError, Output, ensure_categories, render};

/// Form fields to change on update; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct FormPatch {
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl FormPatch {
    /// Overwrite the given fields of a pre-filled form.
    fn apply(self, form: &mut ProductForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(image_url) = self.image_url {
            form.image_url = image_url;
        }
    }
}

/// Apply the requested query changes and show the resulting page.
///
/// Without any change the current query is refetched.
pub async fn list(
    store: &CatalogStore,
    search: Option<String>,
    category: Option<String>,
    page: Option<u32>,
    output: Output,
) -> Result<(), CommandError> {
    let mut fetched = false;

    if let Some(term) = search {
        fetched |= store.set_search_term(term).await? != ListOutcome::Unchanged;
    }
    if let Some(slug) = category {
        fetched |= store.set_category_filter(slug).await? != ListOutcome::Unchanged;
    }
    if let Some(page) = page {
        fetched |= store.set_page(page).await? != ListOutcome::Unchanged;
    }
    if !fetched {
        store.fetch_list().await?;
    }

    let state = store.snapshot();
    output.emit(&state.view(), || render::page(&state))
}

/// Show one product, fetching it if the current list does not hold it.
pub async fn show(store: &CatalogStore, id: ProductId, output: Output) -> Result<(), CommandError> {
    let product = lookup(store, id).await?;
    output.emit(&product, || render::product(&product))
}

/// Create a product from form input.
pub async fn create(
    store: &CatalogStore,
    form: ProductForm,
    output: Output,
) -> Result<(), CommandError> {
    ensure_categories(store).await?;
    let draft = form.into_draft(store.snapshot().categories())?;

    let product = store.create(draft).await?;
    tracing::info!(product_id = %product.id, "Product created");
    output.emit(&product, || render::product(&product))
}

/// Update a product: pre-fill the form from its current values, apply the
/// changed fields and submit.
pub async fn update(
    store: &CatalogStore,
    id: ProductId,
    patch: FormPatch,
    output: Output,
) -> Result<(), CommandError> {
    ensure_categories(store).await?;
    let current = lookup(store, id).await?;

    let keep_images = patch.image_url.is_none();
    let mut form = ProductForm::from_product(&current);
    patch.apply(&mut form);

    let mut draft = form.into_draft(store.snapshot().categories())?;
    if keep_images {
        // The form only carries the first image.
        draft.images = current.images;
    }

    let product = store.update(Product::from_draft(id, draft)).await?;
    output.emit(&product, || render::product(&product))
}

/// Delete a product.
pub async fn delete(store: &CatalogStore, id: ProductId, output: Output) -> Result<(), CommandError> {
    let listed = store.remove(id).await?;
    let state = store.snapshot();
    output.emit(&serde_json::json!({ "deleted": id, "was_listed": listed }), || {
        format!("Deleted product {id}\n\n{}", render::page(&state))
    })
}

async fn lookup(store: &CatalogStore, id: ProductId) -> Result<Product, CommandError> {
    match store.fetch_one(id).await? {
        ProductLookup::Known(product) | ProductLookup::Fetched(product) => Ok(product),
        ProductLookup::Unavailable => Err(CommandError::NotFound(id.to_string())),
    }
}
