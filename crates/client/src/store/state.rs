//! The catalog state snapshot published to subscribers.

use serde::Serialize;
use uuid::Uuid;
use vitrine_core::{Category, CategoryOption, PageView, Product, ProductId, QueryState};

use crate::error::ErrorRecord;

/// A product held in the store's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum CatalogEntry {
    /// Received from a list or single-product fetch.
    Confirmed { product: Product },
    /// Created or edited through this store and possibly not persisted by
    /// the service. Survives refetches whose result omits it.
    Pending { local_id: Uuid, product: Product },
}

impl CatalogEntry {
    #[must_use]
    pub const fn product(&self) -> &Product {
        match self {
            Self::Confirmed { product } | Self::Pending { product, .. } => product,
        }
    }

    #[must_use]
    pub fn into_product(self) -> Product {
        match self {
            Self::Confirmed { product } | Self::Pending { product, .. } => product,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product().id
    }

    /// Whether this product originated locally.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Loading flag and last failure of one concern (products or categories).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConcernStatus {
    pub loading: bool,
    pub error: Option<ErrorRecord>,
}

/// Which error slot a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concern {
    Products,
    Categories,
}

/// Everything the store knows, as one immutable snapshot.
///
/// Presentation code only ever sees clones of this; all mutation goes
/// through [`CatalogStore`](super::CatalogStore) commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    pub(crate) query: QueryState,
    pub(crate) entries: Vec<CatalogEntry>,
    pub(crate) total: u64,
    pub(crate) categories: Vec<Category>,
    pub(crate) products_status: ConcernStatus,
    pub(crate) categories_status: ConcernStatus,
    /// Generation of the latest list fetch; older responses are discarded.
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl CatalogState {
    /// Empty state for the given query.
    #[must_use]
    pub fn new(query: QueryState) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    /// Products for the current query, locally-originated ones first.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Iterate over the products in list order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.entries.iter().map(CatalogEntry::product)
    }

    /// Server total for the current query plus locally-originated products
    /// shown alongside it.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Categories in server order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn products_status(&self) -> &ConcernStatus {
        &self.products_status
    }

    #[must_use]
    pub const fn categories_status(&self) -> &ConcernStatus {
        &self.categories_status
    }

    pub(crate) fn status_mut(&mut self, concern: Concern) -> &mut ConcernStatus {
        match concern {
            Concern::Products => &mut self.products_status,
            Concern::Categories => &mut self.categories_status,
        }
    }

    /// Look up a product in the list.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products().find(|product| product.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// The current page as presentation sees it.
    #[must_use]
    pub fn view(&self) -> PageView<'_> {
        PageView::derive(
            self.products(),
            self.query.page(),
            self.query.limit(),
            self.total,
        )
    }

    /// The category filter listing with the active filter marked.
    #[must_use]
    pub fn category_options(&self) -> Vec<CategoryOption> {
        CategoryOption::list(&self.categories, self.query.category_filter())
    }
}
