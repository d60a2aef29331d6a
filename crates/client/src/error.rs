//! Store error handling with Sentry integration.
//!
//! Every store command returns `Result<T, StoreError>`. Failures that also
//! belong in the state's error slots are condensed into an [`ErrorRecord`].

use serde::Serialize;
use thiserror::Error;
use vitrine_core::{QueryError, ValidationError};

use crate::remote::CatalogError;

/// Error type for catalog store commands.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The product draft was rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The requested query change is not valid.
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    /// The product is unknown both to the service and to the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The catalog service call failed.
    #[error("Catalog error: {0}")]
    Remote(#[from] CatalogError),
}

impl StoreError {
    /// The error category shown to users.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Query(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Remote(err) => ErrorKind::of(err),
        }
    }

    /// Report the error to Sentry if it is a failure worth alerting on.
    ///
    /// Validation and not-found errors are expected outcomes and are only
    /// logged by callers.
    pub fn capture(&self) {
        if matches!(self.kind(), ErrorKind::Transport | ErrorKind::Protocol) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog store error"
            );
        }
    }
}

/// Category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any network call.
    Validation,
    /// The targeted product does not exist.
    NotFound,
    /// Network failure, timeout or server-side error.
    Transport,
    /// The service answered with something the client cannot use.
    Protocol,
}

impl ErrorKind {
    /// Classify a remote error.
    #[must_use]
    pub const fn of(err: &CatalogError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else if err.is_transport() {
            Self::Transport
        } else {
            Self::Protocol
        }
    }
}

/// A failure as recorded in the store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&StoreError> for ErrorRecord {
    fn from(err: &StoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Add a breadcrumb for a store command.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of commands
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("catalog", "Deleted product", Some(&[("product_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
