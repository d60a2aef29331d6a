//! State transitions applied by the store.
//!
//! Each function takes the current state by value and returns the next one,
//! so every command's effect can be tested without a runtime or a network.
//!
//! # Reconciliation rules
//!
//! - A list fetch replaces the list, except that locally-originated products
//!   the result omits are kept at the front when they match the request.
//! - The fetched copy of a product wins over a local one with the same ID.
//! - No two entries ever share an ID.
//! - `total` is the server total plus the locally-originated products shown
//!   alongside the fetched page.

use std::collections::HashSet;

use uuid::Uuid;
use vitrine_core::{Category, ListQuery, ListSelector, Product, ProductId, ProductPage};

use super::state::{CatalogEntry, CatalogState, Concern};
use crate::error::ErrorRecord;

/// Proof that a list fetch was started, used to recognize stale responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    pub(crate) generation: u64,
    pub(crate) query: ListQuery,
}

impl ListTicket {
    /// The request this ticket was issued for.
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// How an update should be applied to an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// The service accepted the update.
    Remote,
    /// The service has no record of the product; the edit only exists here.
    LocalOnly,
}

// =============================================================================
// Products
// =============================================================================

/// Start a list fetch for the current query.
///
/// Supersedes every fetch started before it.
pub fn begin_list_fetch(mut state: CatalogState) -> (CatalogState, ListTicket) {
    state.generation = state.generation.wrapping_add(1);
    state.products_status.loading = true;
    let ticket = ListTicket {
        generation: state.generation,
        query: state.query.list_query(),
    };
    (state, ticket)
}

/// Apply a list fetch result if it is still the latest fetch.
///
/// Returns whether the result was applied. A superseded result leaves the
/// state untouched, including the loading flag owned by the newer fetch.
pub fn complete_list_fetch(
    mut state: CatalogState,
    ticket: &ListTicket,
    result: Result<ProductPage, ErrorRecord>,
) -> (CatalogState, bool) {
    if ticket.generation != state.generation {
        return (state, false);
    }

    state.products_status.loading = false;
    match result {
        Ok(page) => {
            state = merge_page(state, &ticket.query.selector, page);
            state.products_status.error = None;
        }
        Err(error) => state.products_status.error = Some(error),
    }
    (state, true)
}

/// Replace the list with a fetched page, keeping unconfirmed local products
/// that still belong to the request.
pub fn merge_page(
    mut state: CatalogState,
    selector: &ListSelector,
    page: ProductPage,
) -> CatalogState {
    let fetched: HashSet<ProductId> = page.products.iter().map(|p| p.id).collect();

    let preserved: Vec<CatalogEntry> = std::mem::take(&mut state.entries)
        .into_iter()
        .filter(|entry| {
            entry.is_pending() && !fetched.contains(&entry.id()) && selector.matches(entry.product())
        })
        .collect();
    let local_only = preserved.len() as u64;

    let mut seen = HashSet::with_capacity(page.products.len());
    state.entries = preserved
        .into_iter()
        .chain(
            page.products
                .into_iter()
                .filter(|product| seen.insert(product.id))
                .map(|product| CatalogEntry::Confirmed { product }),
        )
        .collect();
    state.total = page.total.saturating_add(local_only);
    state
}

/// Insert a newly created product at the front of the list.
///
/// If the list already holds the assigned ID (some services hand out the
/// same ID for every create), the product gets `fresh_id()` instead.
/// Returns the product as stored.
pub fn insert_created(
    mut state: CatalogState,
    mut product: Product,
    local_id: Uuid,
    fresh_id: impl FnOnce() -> ProductId,
) -> (CatalogState, Product) {
    if state.contains(product.id) {
        let assigned = product.id;
        product.id = fresh_id();
        tracing::warn!(
            assigned = %assigned,
            replacement = %product.id,
            "Catalog service reused an existing product id"
        );
    }

    state.entries.insert(
        0,
        CatalogEntry::Pending {
            local_id,
            product: product.clone(),
        },
    );
    state.total = state.total.saturating_add(1);
    state.products_status.error = None;
    (state, product)
}

/// Replace the entry with the product's ID.
///
/// Returns whether an entry was replaced. `total` never changes. A local-only
/// update turns the entry into a locally-originated one so it survives
/// refetches.
pub fn apply_update(
    mut state: CatalogState,
    product: Product,
    origin: UpdateOrigin,
) -> (CatalogState, bool) {
    let Some(entry) = state.entries.iter_mut().find(|e| e.id() == product.id) else {
        return (state, false);
    };

    *entry = match (&*entry, origin) {
        (CatalogEntry::Pending { local_id, .. }, _) => CatalogEntry::Pending {
            local_id: *local_id,
            product,
        },
        (CatalogEntry::Confirmed { .. }, UpdateOrigin::LocalOnly) => CatalogEntry::Pending {
            local_id: Uuid::new_v4(),
            product,
        },
        (CatalogEntry::Confirmed { .. }, UpdateOrigin::Remote) => CatalogEntry::Confirmed { product },
    };
    state.products_status.error = None;
    (state, true)
}

/// Append a product fetched on its own, unless the list already has it.
///
/// Returns the product as held in the list.
pub fn append_fetched(mut state: CatalogState, product: Product) -> (CatalogState, Product) {
    if let Some(existing) = state.product(product.id) {
        let existing = existing.clone();
        return (state, existing);
    }

    state.entries.push(CatalogEntry::Confirmed {
        product: product.clone(),
    });
    state.total = state.total.saturating_add(1);
    state.products_status.error = None;
    (state, product)
}

/// Apply a successful delete of `id`.
///
/// Drops the entry if the list holds it and decrements `total` either way,
/// since the product may sit on another page of the result set. Returns
/// whether an entry was removed.
pub fn apply_removal(mut state: CatalogState, id: ProductId) -> (CatalogState, bool) {
    let before = state.entries.len();
    state.entries.retain(|entry| entry.id() != id);
    let removed = state.entries.len() != before;
    state.total = state.total.saturating_sub(1);
    state.products_status.error = None;
    (state, removed)
}

// =============================================================================
// Categories
// =============================================================================

pub fn begin_categories_fetch(mut state: CatalogState) -> CatalogState {
    state.categories_status.loading = true;
    state
}

/// Apply a category fetch result. A failure keeps the known categories.
pub fn complete_categories_fetch(
    mut state: CatalogState,
    result: Result<Vec<Category>, ErrorRecord>,
) -> CatalogState {
    state.categories_status.loading = false;
    match result {
        Ok(categories) => {
            state.categories = categories;
            state.categories_status.error = None;
        }
        Err(error) => state.categories_status.error = Some(error),
    }
    state
}

// =============================================================================
// Errors
// =============================================================================

/// Record a failure in a concern's error slot.
pub fn record_error(mut state: CatalogState, concern: Concern, error: ErrorRecord) -> CatalogState {
    state.status_mut(concern).error = Some(error);
    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use vitrine_core::{Price, QueryState};

    use super::*;
    use crate::error::ErrorKind;

    fn product(id: i64, title: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::new(Decimal::ONE_HUNDRED),
            description: String::new(),
            category: category.to_string(),
            images: vec![],
        }
    }

    fn page(products: Vec<Product>, total: u64) -> ProductPage {
        ProductPage { products, total }
    }

    fn ids(state: &CatalogState) -> Vec<i64> {
        state.products().map(|p| p.id.as_i64()).collect()
    }

    fn with_pending(state: CatalogState, product: Product) -> CatalogState {
        insert_created(state, product, Uuid::new_v4(), || ProductId::new(-1)).0
    }

    fn transport_error() -> ErrorRecord {
        ErrorRecord {
            kind: ErrorKind::Transport,
            message: "offline".to_string(),
        }
    }

    #[test]
    fn test_fetch_replaces_confirmed_entries() {
        let (state, ticket) = begin_list_fetch(CatalogState::default());
        assert!(state.products_status.loading);

        let (state, applied) =
            complete_list_fetch(state, &ticket, Ok(page(vec![product(1, "A", "x")], 1)));
        assert!(applied);

        let (state, ticket) = begin_list_fetch(state);
        let (state, _) =
            complete_list_fetch(state, &ticket, Ok(page(vec![product(2, "B", "x")], 7)));

        assert_eq!(ids(&state), vec![2]);
        assert_eq!(state.total, 7);
        assert!(!state.products_status.loading);
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let (state, stale) = begin_list_fetch(CatalogState::default());
        let (state, current) = begin_list_fetch(state);

        let (state, applied) =
            complete_list_fetch(state, &stale, Ok(page(vec![product(1, "A", "x")], 1)));
        assert!(!applied);
        assert!(state.products().next().is_none());
        assert!(state.products_status.loading);

        let (state, applied) =
            complete_list_fetch(state, &current, Ok(page(vec![product(2, "B", "x")], 1)));
        assert!(applied);
        assert_eq!(ids(&state), vec![2]);
        assert!(!state.products_status.loading);
    }

    #[test]
    fn test_stale_failure_is_not_recorded() {
        let (state, stale) = begin_list_fetch(CatalogState::default());
        let (state, _current) = begin_list_fetch(state);

        let (state, applied) = complete_list_fetch(state, &stale, Err(transport_error()));
        assert!(!applied);
        assert!(state.products_status.error.is_none());
    }

    #[test]
    fn test_failed_fetch_keeps_list() {
        let (state, ticket) = begin_list_fetch(CatalogState::default());
        let (state, _) =
            complete_list_fetch(state, &ticket, Ok(page(vec![product(1, "A", "x")], 1)));

        let (state, ticket) = begin_list_fetch(state);
        let (state, _) = complete_list_fetch(state, &ticket, Err(transport_error()));

        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.products_status.error, Some(transport_error()));
        assert!(!state.products_status.loading);

        let (state, ticket) = begin_list_fetch(state);
        let (state, _) = complete_list_fetch(state, &ticket, Ok(page(vec![], 0)));
        assert!(state.products_status.error.is_none());
    }

    #[test]
    fn test_pending_entry_survives_refetch() {
        let state = with_pending(CatalogState::default(), product(101, "Phone X", "smartphones"));

        let state = merge_page(
            state,
            &ListSelector::All,
            page(vec![product(1, "A", "beauty"), product(2, "B", "beauty")], 194),
        );

        assert_eq!(ids(&state), vec![101, 1, 2]);
        assert_eq!(state.total, 195);
    }

    #[test]
    fn test_fetched_copy_wins_over_pending() {
        let state = with_pending(CatalogState::default(), product(101, "Local", "smartphones"));

        let state = merge_page(
            state,
            &ListSelector::All,
            page(vec![product(101, "Server", "smartphones")], 1),
        );

        assert_eq!(ids(&state), vec![101]);
        assert_eq!(state.products().next().unwrap().title, "Server");
        assert!(!state.entries()[0].is_pending());
        assert_eq!(state.total, 1);
    }

    #[test]
    fn test_pending_entry_outside_filter_is_dropped() {
        let state = with_pending(CatalogState::default(), product(101, "Phone X", "smartphones"));

        let state = merge_page(
            state,
            &ListSelector::Category("beauty".to_string()),
            page(vec![product(1, "A", "beauty")], 5),
        );

        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.total, 5);
    }

    #[test]
    fn test_duplicate_ids_in_page_are_collapsed() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x"), product(1, "A again", "x")], 2),
        );
        assert_eq!(ids(&state), vec![1]);
    }

    #[test]
    fn test_insert_created_front_and_total() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 10),
        );

        let (state, stored) = insert_created(state, product(101, "New", "x"), Uuid::new_v4(), || {
            ProductId::new(-1)
        });

        assert_eq!(stored.id, ProductId::new(101));
        assert_eq!(ids(&state), vec![101, 1]);
        assert_eq!(state.total, 11);
        assert!(state.entries()[0].is_pending());
    }

    #[test]
    fn test_insert_created_reassigns_reused_id() {
        let state = with_pending(CatalogState::default(), product(195, "First", "x"));

        let (state, stored) = insert_created(state, product(195, "Second", "x"), Uuid::new_v4(), || {
            ProductId::new(9_000)
        });

        assert_eq!(stored.id, ProductId::new(9_000));
        assert_eq!(ids(&state), vec![9_000, 195]);
        assert_eq!(state.total, 2);
    }

    #[test]
    fn test_remote_update_keeps_origin() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 3),
        );

        let (state, replaced) = apply_update(state, product(1, "Renamed", "x"), UpdateOrigin::Remote);

        assert!(replaced);
        assert_eq!(state.product(ProductId::new(1)).unwrap().title, "Renamed");
        assert!(!state.entries()[0].is_pending());
        assert_eq!(state.total, 3);
    }

    #[test]
    fn test_local_update_marks_entry_pending() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 3),
        );

        let (state, replaced) =
            apply_update(state, product(1, "Renamed", "x"), UpdateOrigin::LocalOnly);

        assert!(replaced);
        assert!(state.entries()[0].is_pending());
        assert_eq!(state.total, 3);
    }

    #[test]
    fn test_update_of_unknown_id_changes_nothing() {
        let before = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 1),
        );

        let (after, replaced) =
            apply_update(before.clone(), product(2, "B", "x"), UpdateOrigin::LocalOnly);

        assert!(!replaced);
        assert_eq!(after, before);
    }

    #[test]
    fn test_append_fetched_skips_known_id() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 1),
        );

        let (state, held) = append_fetched(state, product(1, "Other", "x"));
        assert_eq!(held.title, "A");
        assert_eq!(state.total, 1);

        let (state, held) = append_fetched(state, product(2, "B", "x"));
        assert_eq!(held.title, "B");
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.total, 2);
    }

    #[test]
    fn test_removal_decrements_total_for_any_delete() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 4),
        );

        let (state, removed) = apply_removal(state, ProductId::new(1));
        assert!(removed);
        assert_eq!(state.total, 3);

        // Listed on another page
        let (state, removed) = apply_removal(state, ProductId::new(9));
        assert!(!removed);
        assert_eq!(state.total, 2);
    }

    #[test]
    fn test_removal_never_underflows_total() {
        let state = merge_page(
            CatalogState::default(),
            &ListSelector::All,
            page(vec![product(1, "A", "x")], 0),
        );

        let (state, removed) = apply_removal(state, ProductId::new(1));
        assert!(removed);
        assert_eq!(state.total, 0);

        let (state, _) = apply_removal(state, ProductId::new(2));
        assert_eq!(state.total, 0);
    }

    #[test]
    fn test_categories_failure_keeps_known_categories() {
        let categories = vec![Category::from_label("beauty", "https://catalog.test")];
        let state = begin_categories_fetch(CatalogState::default());
        assert!(state.categories_status.loading);

        let state = complete_categories_fetch(state, Ok(categories.clone()));
        let state = complete_categories_fetch(begin_categories_fetch(state), Err(transport_error()));

        assert_eq!(state.categories, categories);
        assert_eq!(state.categories_status.error, Some(transport_error()));
        assert!(!state.categories_status.loading);
    }

    #[test]
    fn test_ticket_carries_current_query() {
        let mut query = QueryState::default();
        query.set_category_filter("beauty");

        let (_, ticket) = begin_list_fetch(CatalogState::new(query));
        assert_eq!(
            ticket.query().selector,
            ListSelector::Category("beauty".to_string())
        );
    }

    #[test]
    fn test_record_error_targets_one_slot() {
        let state = record_error(CatalogState::default(), Concern::Categories, transport_error());
        assert!(state.products_status.error.is_none());
        assert_eq!(state.categories_status.error, Some(transport_error()));
    }
}
