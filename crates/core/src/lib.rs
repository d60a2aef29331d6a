//! Vitrine Core - Shared catalog types.
//!
//! This crate provides the types used across all Vitrine components:
//! - `client` - Remote catalog client and the catalog store
//! - `cli` - Command-line front end driving the store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and lets the query and view
//! rules be tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, products, drafts and categories
//! - [`query`] - Query state (page, search term, category filter)
//! - [`view`] - Derived page view and category listing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod query;
pub mod types;
pub mod view;

pub use query::{ListQuery, ListSelector, ProductPage, QueryError, QueryState};
pub use types::*;
pub use view::{CategoryOption, PageView};
