//! The remote catalog contract the store is written against.

use std::future::Future;

use vitrine_core::{Category, ListQuery, Product, ProductDraft, ProductId, ProductPage};

use super::CatalogError;

/// Result of a remote update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The service accepted the update and returned the stored record.
    Applied(Product),
    /// The service has no record of the product (HTTP 404).
    ///
    /// Not a hard failure: the caller decides whether to apply the update
    /// locally.
    Missing,
}

/// One operation per remote catalog capability.
///
/// [`CatalogClient`](super::CatalogClient) implements this over HTTP; the
/// store is generic over it so it can run against any backend.
pub trait CatalogApi: Send + Sync {
    /// List one page of products.
    ///
    /// The selector decides the endpoint: category listing, search, or the
    /// unfiltered listing.
    fn list_products(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// List all categories, normalized to full records.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Fetch a single product.
    ///
    /// Fails with [`CatalogError::NotFound`] if the service reports 404.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Create a product. The returned product always carries an ID.
    fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Update a product.
    fn update_product(
        &self,
        product: &Product,
    ) -> impl Future<Output = Result<UpdateOutcome, CatalogError>> + Send;

    /// Delete a product. Deleting a product the service does not know is a
    /// success.
    fn delete_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductId, CatalogError>> + Send;
}
