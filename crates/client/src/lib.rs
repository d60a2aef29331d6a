//! Vitrine catalog client library.
//!
//! Talks to a remote product catalog service and keeps a client-side copy
//! of the catalog that survives the service not persisting writes.
//!
//! - [`remote`] - HTTP client for the catalog service
//! - [`store`] - the catalog store, its state and reconciliation rules
//! - [`config`] - configuration from environment variables
//! - [`error`] - store errors and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod remote;
pub mod store;

pub use config::{CatalogConfig, ConfigError, SentryConfig};
pub use error::{ErrorKind, ErrorRecord, StoreError};
pub use remote::{CatalogApi, CatalogClient, CatalogError, UpdateOutcome};
pub use store::{CatalogState, CatalogStore, ListOutcome, ProductLookup};
