//! HTTP implementation of [`CatalogApi`].

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use vitrine_core::{
    Category, ListQuery, ListSelector, Product, ProductDraft, ProductId, ProductPage,
};

use super::api::{CatalogApi, UpdateOutcome};
use super::ids::LocalIdSource;
use super::wire::{ProductListResponse, ProductPayload, WireCategory, WireProduct};
use super::{CatalogError, body_preview};
use crate::config::CatalogConfig;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote catalog service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    ids: LocalIdSource,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url().to_string(),
                ids: LocalIdSource::new(),
            }),
        })
    }

    /// Base URL of the catalog service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build the URL for a path under the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.base_url))?)
    }

    /// Build the listing URL for a list request.
    ///
    /// Exactly one endpoint is chosen per selector, so a category listing
    /// never carries a search term and vice versa.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL cannot be extended.
    pub fn list_url(&self, query: &ListQuery) -> Result<Url, CatalogError> {
        let mut url = match &query.selector {
            ListSelector::All => self.endpoint("/products")?,
            ListSelector::Search(_) => self.endpoint("/products/search")?,
            ListSelector::Category(slug) => {
                self.endpoint(&format!("/products/category/{}", urlencoding::encode(slug)))?
            }
        };

        {
            let mut pairs = url.query_pairs_mut();
            if let ListSelector::Search(term) = &query.selector {
                pairs.append_pair("q", term);
            }
            pairs
                .append_pair("limit", &query.limit.to_string())
                .append_pair("skip", &query.skip.to_string());
        }

        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    ///
    /// 404 becomes [`CatalogError::NotFound`] naming `resource`; 429 becomes
    /// [`CatalogError::RateLimited`]; any other non-success status becomes
    /// [`CatalogError::Server`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<String, CatalogError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(resource.to_string()));
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body_preview(&body),
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Server {
                status: status.as_u16(),
                body: body_preview(&body),
            });
        }

        Ok(body)
    }

    /// Send a write and parse the echoed record, tolerating an empty body.
    async fn send_write(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<WireProduct, CatalogError> {
        let body = self.send(request, resource).await?;
        if body.trim().is_empty() {
            return Ok(WireProduct::default());
        }
        parse(&body)
    }
}

/// Parse a JSON body, logging a preview of anything unparsable.
fn parse<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body_preview(body),
            "Failed to parse catalog response"
        );
        CatalogError::Parse(e)
    })
}

impl CatalogApi for CatalogClient {
    #[instrument(skip(self))]
    async fn list_products(&self, query: &ListQuery) -> Result<ProductPage, CatalogError> {
        let url = self.list_url(query)?;
        let body = self.send(self.inner.client.get(url), "product listing").await?;
        let response: ProductListResponse = parse(&body)?;
        let page = response.into_page();
        debug!(count = page.products.len(), total = page.total, "Fetched product page");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let url = self.endpoint("/products/categories")?;
        let body = self.send(self.inner.client.get(url), "category list").await?;
        let raw: Vec<WireCategory> = parse(&body)?;

        Ok(raw
            .into_iter()
            .map(|category| category.normalize(&self.inner.base_url))
            .collect())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        let body = self
            .send(self.inner.client.get(url), &format!("product {id}"))
            .await?;
        let raw: WireProduct = parse(&body)?;
        Ok(raw.into_product()?)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let url = self.endpoint("/products/add")?;
        let request = self
            .inner
            .client
            .post(url)
            .json(&ProductPayload::from(draft));
        let response = self.send_write(request, "product create").await?;

        let id = response.id.unwrap_or_else(|| {
            let id = self.inner.ids.next_id();
            warn!(product_id = %id, "Catalog service returned no id, synthesized one");
            id
        });

        Ok(response.merge_over(Product::from_draft(id, draft.clone())))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update_product(&self, product: &Product) -> Result<UpdateOutcome, CatalogError> {
        let url = self.endpoint(&format!("/products/{}", product.id))?;
        let draft = product.to_draft();
        let request = self.inner.client.put(url).json(&ProductPayload::from(&draft));

        match self
            .send_write(request, &format!("product {}", product.id))
            .await
        {
            Ok(response) => Ok(UpdateOutcome::Applied(response.merge_over(product.clone()))),
            Err(CatalogError::NotFound(_)) => {
                warn!("Catalog service has no record of product, update not stored remotely");
                Ok(UpdateOutcome::Missing)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<ProductId, CatalogError> {
        let url = self.endpoint(&format!("/products/{id}"))?;

        match self
            .send(self.inner.client.delete(url), &format!("product {id}"))
            .await
        {
            Ok(_) => Ok(id),
            Err(CatalogError::NotFound(_)) => {
                warn!("Product already absent remotely, treating delete as done");
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }
}
