//! Client-side catalog store.
//!
//! # Architecture
//!
//! - One [`CatalogStore`] per process, created at startup and shared by
//!   cloning; every clone sees the same state
//! - State lives in a `tokio::sync::watch` channel: commands publish whole
//!   new snapshots, presentation reads them with [`CatalogStore::snapshot`]
//!   or waits for changes via [`CatalogStore::subscribe`]
//! - Every transition is a pure function in [`reconcile`], applied
//!   atomically; network calls happen between transitions, never inside one
//! - Each list fetch carries a generation number and only the latest one may
//!   touch the list, so responses arriving out of order cannot overwrite
//!   newer results
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_client::{CatalogClient, CatalogStore};
//!
//! let store = CatalogStore::new(CatalogClient::new(&config)?, config.page_size);
//! store.fetch_categories().await?;
//! store.set_search_term("phone").await?;
//!
//! for product in store.snapshot().view().page_items {
//!     println!("{} {}", product.id, product.title);
//! }
//! ```

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod fake;
pub mod reconcile;
mod state;

pub use reconcile::{ListTicket, UpdateOrigin};
pub use state::{CatalogEntry, CatalogState, Concern, ConcernStatus};

use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use vitrine_core::{Product, ProductDraft, ProductId, QueryState};

use crate::error::{ErrorRecord, Result, StoreError, add_breadcrumb};
use crate::remote::{CatalogApi, CatalogClient, LocalIdSource, UpdateOutcome};

/// Outcome of a list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// The fetched page is now the current list.
    Applied,
    /// A newer fetch started before this one finished; its result was
    /// discarded.
    Superseded,
    /// The query did not change, so nothing was fetched.
    Unchanged,
}

/// Outcome of [`CatalogStore::fetch_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductLookup {
    /// Already in the list; no request was made.
    Known(Product),
    /// Fetched and appended to the list.
    Fetched(Product),
    /// The service has no such product. Recorded in the products error
    /// slot.
    Unavailable,
}

impl ProductLookup {
    /// The product, if there is one.
    #[must_use]
    pub fn into_product(self) -> Option<Product> {
        match self {
            Self::Known(product) | Self::Fetched(product) => Some(product),
            Self::Unavailable => None,
        }
    }
}

// =============================================================================
// CatalogStore
// =============================================================================

/// The single owner of catalog state.
pub struct CatalogStore<A = CatalogClient> {
    inner: Arc<StoreInner<A>>,
}

struct StoreInner<A> {
    api: A,
    state: watch::Sender<CatalogState>,
    ids: LocalIdSource,
}

impl<A> Clone for CatalogStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for CatalogStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("CatalogStore")
            .field("query", &state.query)
            .field("entries", &state.entries.len())
            .field("total", &state.total)
            .finish_non_exhaustive()
    }
}

impl<A: CatalogApi> CatalogStore<A> {
    /// Create a store with an empty list and the given page size.
    #[must_use]
    pub fn new(api: A, page_size: NonZeroU32) -> Self {
        Self::with_query(api, QueryState::new(page_size))
    }

    /// Create a store starting from an existing query.
    #[must_use]
    pub fn with_query(api: A, query: QueryState) -> Self {
        let (state, _) = watch::channel(CatalogState::new(query));
        Self {
            inner: Arc::new(StoreInner {
                api,
                state,
                ids: LocalIdSource::new(),
            }),
        }
    }

    /// The remote catalog this store talks to.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.inner.state.borrow().clone()
    }

    /// Receive every state the store publishes from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.inner.state.subscribe()
    }

    /// Apply a transition atomically and publish the result.
    fn transition<R>(&self, apply: impl FnOnce(CatalogState) -> (CatalogState, R)) -> R {
        let mut output = None;
        self.inner.state.send_modify(|state| {
            let (next, result) = apply(std::mem::take(state));
            *state = next;
            output = Some(result);
        });
        match output {
            Some(result) => result,
            None => unreachable!("send_modify always runs its closure"),
        }
    }

    /// Record a remote failure in a concern's error slot and convert it.
    fn fail(&self, concern: Concern, err: impl Into<StoreError>) -> StoreError {
        let err = err.into();
        let record = ErrorRecord::from(&err);
        self.transition(|state| (reconcile::record_error(state, concern, record), ()));
        err.capture();
        err
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch the list for the current query.
    ///
    /// On failure the previous list stays visible and the error is recorded
    /// in the products slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch failed and was still the latest one.
    #[instrument(skip(self))]
    pub async fn fetch_list(&self) -> Result<ListOutcome> {
        let ticket = self.transition(reconcile::begin_list_fetch);
        self.run_list_fetch(ticket).await
    }

    async fn run_list_fetch(&self, ticket: ListTicket) -> Result<ListOutcome> {
        debug!(selector = ?ticket.query.selector, skip = ticket.query.skip, "Fetching product list");

        match self.inner.api.list_products(&ticket.query).await {
            Ok(page) => {
                let applied =
                    self.transition(|state| reconcile::complete_list_fetch(state, &ticket, Ok(page)));
                if applied {
                    Ok(ListOutcome::Applied)
                } else {
                    debug!("Discarding superseded product list");
                    Ok(ListOutcome::Superseded)
                }
            }
            Err(err) => {
                let err = StoreError::from(err);
                let record = ErrorRecord::from(&err);
                let applied =
                    self.transition(|state| reconcile::complete_list_fetch(state, &ticket, Err(record)));
                if applied {
                    err.capture();
                    Err(err)
                } else {
                    debug!(error = %err, "Ignoring failure of superseded product list");
                    Ok(ListOutcome::Superseded)
                }
            }
        }
    }

    /// Change the query and fetch the list for it, if the change did
    /// anything.
    async fn requery(
        &self,
        change: impl FnOnce(&mut QueryState) -> Result<bool>,
    ) -> Result<ListOutcome> {
        let ticket = self.transition(|mut state| match change(&mut state.query) {
            Ok(true) => {
                let (state, ticket) = reconcile::begin_list_fetch(state);
                (state, Ok(Some(ticket)))
            }
            Ok(false) => (state, Ok(None)),
            Err(err) => (state, Err(err)),
        })?;

        match ticket {
            Some(ticket) => self.run_list_fetch(ticket).await,
            None => Ok(ListOutcome::Unchanged),
        }
    }

    /// Set the search term, return to page 1 and refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting fetch failed.
    #[instrument(skip(self, term))]
    pub async fn set_search_term(&self, term: impl Into<String>) -> Result<ListOutcome> {
        let term = term.into();
        add_breadcrumb("catalog", "Search", Some(&[("term", term.as_str())]));
        self.requery(|query| Ok(query.set_search_term(term))).await
    }

    /// Set the category filter (empty for all), return to page 1 and
    /// refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting fetch failed.
    #[instrument(skip(self, slug))]
    pub async fn set_category_filter(
        &self,
        slug: impl Into<String>,
    ) -> Result<ListOutcome> {
        let slug = slug.into();
        add_breadcrumb("catalog", "Filter by category", Some(&[("category", slug.as_str())]));
        self.requery(|query| Ok(query.set_category_filter(slug))).await
    }

    /// Move to another page of the current result set and refetch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] for page 0, or an error if the fetch
    /// failed.
    #[instrument(skip(self))]
    pub async fn set_page(&self, page: u32) -> Result<ListOutcome> {
        self.requery(|query| Ok(query.set_page(page)?)).await
    }

    /// Fetch the category list.
    ///
    /// Known categories are kept if the fetch fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch failed.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<()> {
        self.transition(|state| (reconcile::begin_categories_fetch(state), ()));

        match self.inner.api.list_categories().await {
            Ok(categories) => {
                debug!(count = categories.len(), "Fetched categories");
                self.transition(|state| {
                    (reconcile::complete_categories_fetch(state, Ok(categories)), ())
                });
                Ok(())
            }
            Err(err) => {
                let err = StoreError::from(err);
                let record = ErrorRecord::from(&err);
                self.transition(|state| {
                    (reconcile::complete_categories_fetch(state, Err(record)), ())
                });
                err.capture();
                Err(err)
            }
        }
    }

    /// Make a single product available in the list.
    ///
    /// Does nothing if the list already has it; otherwise fetches it and
    /// appends it.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than the product not existing.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_one(&self, id: ProductId) -> Result<ProductLookup> {
        let known = self.inner.state.borrow().product(id).cloned();
        if let Some(product) = known {
            debug!("Product already in list");
            return Ok(ProductLookup::Known(product));
        }

        match self.inner.api.get_product(id).await {
            Ok(product) => {
                let product = self.transition(|state| reconcile::append_fetched(state, product));
                Ok(ProductLookup::Fetched(product))
            }
            Err(err) if err.is_not_found() => {
                info!("Product does not exist");
                self.fail(Concern::Products, err);
                Ok(ProductLookup::Unavailable)
            }
            Err(err) => Err(self.fail(Concern::Products, err)),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate the draft against the known categories.
    fn validate(&self, draft: &ProductDraft) -> Result<()> {
        let state = self.inner.state.borrow();
        Ok(draft.validate(&state.categories)?)
    }

    /// Create a product and put it at the front of the list.
    ///
    /// The product stays visible across refetches even if the service did
    /// not persist it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] without any network call if the
    /// draft is invalid, or an error if the service call failed. Nothing is
    /// inserted on failure.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product> {
        self.validate(&draft)?;
        add_breadcrumb("catalog", "Create product", Some(&[("title", draft.title.as_str())]));

        let created = self
            .inner
            .api
            .create_product(&draft)
            .await
            .map_err(|err| self.fail(Concern::Products, err))?;

        let product = self.transition(|state| {
            reconcile::insert_created(state, created, Uuid::new_v4(), || self.inner.ids.next_id())
        });
        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Update a product.
    ///
    /// If the service has no record of the product but the list does, the
    /// update is applied locally only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] without any network call if the
    /// product is invalid, [`StoreError::NotFound`] if neither the service
    /// nor the list knows it, or an error if the service call failed.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update(&self, product: Product) -> Result<Product> {
        self.validate(&product.to_draft())?;
        let id = product.id.to_string();
        add_breadcrumb("catalog", "Update product", Some(&[("product_id", id.as_str())]));

        let outcome = self
            .inner
            .api
            .update_product(&product)
            .await
            .map_err(|err| self.fail(Concern::Products, err))?;

        match outcome {
            UpdateOutcome::Applied(updated) => {
                let stored = updated.clone();
                self.transition(|state| {
                    reconcile::apply_update(state, stored, UpdateOrigin::Remote)
                });
                Ok(updated)
            }
            UpdateOutcome::Missing => {
                let stored = product.clone();
                let applied = self.transition(|state| {
                    reconcile::apply_update(state, stored, UpdateOrigin::LocalOnly)
                });
                if applied {
                    warn!("Service has no record of product, applied update locally");
                    Ok(product)
                } else {
                    Err(self.fail(Concern::Products, StoreError::NotFound(format!("product {id}"))))
                }
            }
        }
    }

    /// Delete a product, drop it from the list and decrement the total.
    ///
    /// Returns whether the list held the product.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call failed; the list is unchanged.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: ProductId) -> Result<bool> {
        add_breadcrumb("catalog", "Delete product", Some(&[("product_id", id.to_string().as_str())]));

        self.inner
            .api
            .delete_product(id)
            .await
            .map_err(|err| self.fail(Concern::Products, err))?;

        let removed = self.transition(|state| reconcile::apply_removal(state, id));
        info!(removed, "Deleted product");
        Ok(removed)
    }
}
