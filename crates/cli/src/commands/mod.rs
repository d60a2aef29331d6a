//! Command implementations.
//!
//! Every command takes the process-wide [`CatalogStore`], drives it through
//! its public commands and prints what the store then holds.

pub mod categories;
pub mod products;
mod render;
pub mod shell;

use serde::Serialize;
use thiserror::Error;
use vitrine_client::{CatalogError, CatalogStore, StoreError};
use vitrine_core::ValidationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A store command failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("Catalog client error: {0}")]
    Client(#[from] CatalogError),

    /// Form input was rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The product does not exist.
    #[error("Product {0} not found")]
    NotFound(String),

    /// The command line could not be understood.
    #[error("{0}")]
    Usage(String),

    /// Reading commands or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as JSON, or its text rendering.
    #[allow(clippy::print_stdout)]
    fn emit<T: Serialize + ?Sized>(
        self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), CommandError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

/// Fetch the category list unless the store already has one.
async fn ensure_categories(store: &CatalogStore) -> Result<(), CommandError> {
    if store.snapshot().categories().is_empty() {
        store.fetch_categories().await?;
    }
    Ok(())
}
