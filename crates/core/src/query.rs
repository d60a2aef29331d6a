//! Query state: which slice of the catalog is currently requested.
//!
//! Changing the search term or the category filter changes what a page
//! means, so both reset the page to 1. Only [`QueryState::set_page`] moves
//! between pages of the same result set.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(6) {
    Some(size) => size,
    None => unreachable!(),
};

/// Errors from invalid query state changes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Pages are 1-based.
    #[error("page must be at least 1 (got {0})")]
    InvalidPage(u32),
}

/// Pagination, search and category filter for the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    page: u32,
    limit: NonZeroU32,
    search_term: String,
    category_filter: String,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    /// Create a query state on page 1 with no filters.
    #[must_use]
    pub const fn new(limit: NonZeroU32) -> Self {
        Self {
            page: 1,
            limit,
            search_term: String::new(),
            category_filter: String::new(),
        }
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Fixed page size.
    #[must_use]
    pub const fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    /// Free-text search term (empty for none).
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Category slug filter (empty for all categories).
    #[must_use]
    pub fn category_filter(&self) -> &str {
        &self.category_filter
    }

    /// Set the search term and return to page 1.
    ///
    /// Returns `true` if any field changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        let changed = self.search_term != term || self.page != 1;
        self.search_term = term;
        self.page = 1;
        changed
    }

    /// Set the category filter and return to page 1.
    ///
    /// Returns `true` if any field changed.
    pub fn set_category_filter(&mut self, slug: impl Into<String>) -> bool {
        let slug = slug.into();
        let changed = self.category_filter != slug || self.page != 1;
        self.category_filter = slug;
        self.page = 1;
        changed
    }

    /// Move to another page of the same result set.
    ///
    /// Returns `true` if the page changed.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidPage`] for page 0.
    pub fn set_page(&mut self, page: u32) -> Result<bool, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }
        let changed = self.page != page;
        self.page = page;
        Ok(changed)
    }

    /// Number of items before the current page.
    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit.get())
    }

    /// The list request for the current state.
    ///
    /// A category filter takes precedence over a search term; a blank search
    /// term means no search.
    #[must_use]
    pub fn list_query(&self) -> ListQuery {
        let selector = if !self.category_filter.is_empty() {
            ListSelector::Category(self.category_filter.clone())
        } else if !self.search_term.trim().is_empty() {
            ListSelector::Search(self.search_term.trim().to_string())
        } else {
            ListSelector::All
        };

        ListQuery {
            selector,
            limit: self.limit,
            skip: self.skip(),
        }
    }
}

/// Which listing endpoint a list request targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ListSelector {
    /// Unfiltered listing.
    All,
    /// Free-text search.
    Search(String),
    /// Products in one category (by slug).
    Category(String),
}

impl ListSelector {
    /// Whether a product would plausibly appear in this listing.
    ///
    /// Used to decide which locally-originated products survive a refetch:
    /// category filters compare slugs, searches look for the term in the
    /// title or description, case-insensitively.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(slug) => product.category == *slug,
            Self::Search(term) => {
                let term = term.to_lowercase();
                product.title.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
        }
    }
}

/// A single list request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub selector: ListSelector,
    pub limit: NonZeroU32,
    pub skip: u64,
}

/// One page of a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Server-reported number of matches for the whole query.
    pub total: u64,
}
