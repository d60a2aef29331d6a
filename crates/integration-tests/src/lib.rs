//! Integration tests for Vitrine.
//!
//! Every test runs the real HTTP client and store against a `wiremock`
//! server standing in for the catalog service, so no network access is
//! needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `remote_client` - request shapes, response normalization, status mapping
//! - `catalog_store` - store behavior end to end over HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use serde_json::{Value, json};
use vitrine_client::{CatalogClient, CatalogConfig, CatalogStore};
use wiremock::MockServer;

/// Client for a mock catalog service.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid catalog URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn client_for(server: &MockServer) -> CatalogClient {
    let mut config = CatalogConfig::for_url(&server.uri()).unwrap();
    config.request_timeout = Duration::from_secs(2);
    CatalogClient::new(&config).unwrap()
}

/// Store over a client for a mock catalog service, with page size 6.
#[must_use]
pub fn store_for(server: &MockServer) -> CatalogStore {
    CatalogStore::new(client_for(server), vitrine_core::query::DEFAULT_PAGE_SIZE)
}

/// A product record as the catalog service sends it.
#[must_use]
pub fn product_json(id: i64, title: &str, category: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "price": 9.99,
        "category": category,
        "images": [format!("https://cdn.test/{id}.png")],
        "thumbnail": format!("https://cdn.test/{id}-thumb.png"),
        "rating": 4.5,
        "stock": 10
    })
}

/// A list response with the given products and total.
#[must_use]
pub fn list_json(products: Vec<Value>, total: u64, skip: u64) -> Value {
    let limit = products.len();
    json!({
        "products": products,
        "total": total,
        "skip": skip,
        "limit": limit
    })
}

/// Products `first..=last`, all in one category.
#[must_use]
pub fn products_json(first: i64, last: i64, category: &str) -> Vec<Value> {
    (first..=last)
        .map(|id| product_json(id, &format!("Product {id}"), category))
        .collect()
}

/// Category records as the current catalog service sends them.
#[must_use]
pub fn categories_json(slugs: &[&str]) -> Value {
    Value::Array(
        slugs
            .iter()
            .map(|slug| {
                json!({
                    "slug": slug,
                    "name": vitrine_core::title_case(slug),
                    "url": format!("https://dummyjson.com/products/category/{slug}")
                })
            })
            .collect(),
    )
}
