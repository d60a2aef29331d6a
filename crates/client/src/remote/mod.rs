//! Remote catalog service client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`, no request or response envelope
//! - The catalog service is source of truth for listings; writes may not
//!   persist on the server, which the store compensates for
//! - Response shapes are normalized here, at the boundary: legacy
//!   bare-string categories become full [`Category`] records before they
//!   reach the store
//!
//! # Endpoints
//!
//! - `GET /products?limit=&skip=` - unfiltered listing
//! - `GET /products/search?q=&limit=&skip=` - free-text search
//! - `GET /products/category/{slug}?limit=&skip=` - category listing
//! - `GET /products/categories` - category list
//! - `GET /products/{id}`, `PUT /products/{id}`, `DELETE /products/{id}`
//! - `POST /products/add`
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_client::remote::{CatalogApi, CatalogClient};
//!
//! let client = CatalogClient::new(&config)?;
//! let categories = client.list_categories().await?;
//! let page = client.list_products(&query.list_query()).await?;
//! ```
//!
//! [`Category`]: vitrine_core::Category

mod api;
mod client;
mod ids;
mod wire;

pub use api::{CatalogApi, UpdateOutcome};
pub use client::CatalogClient;
pub use ids::LocalIdSource;

use thiserror::Error;

/// Maximum number of response body characters kept in errors and logs.
const BODY_PREVIEW_CHARS: usize = 500;

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The targeted resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("Server error: HTTP {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CatalogError {
    /// Whether the service reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is a network or server-side failure unrelated to
    /// resource existence.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited(_) => true,
            Self::Server { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Parse(_) | Self::Url(_) => false,
        }
    }
}

/// Truncate a response body for logs and error messages.
fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");

        let err = CatalogError::Server {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Server error: HTTP 503: unavailable");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert!(err.is_transport());
    }

    #[test]
    fn test_classification() {
        assert!(CatalogError::NotFound(String::new()).is_not_found());
        assert!(!CatalogError::NotFound(String::new()).is_transport());
        assert!(
            CatalogError::Server {
                status: 502,
                body: String::new()
            }
            .is_transport()
        );
        assert!(
            !CatalogError::Server {
                status: 400,
                body: String::new()
            }
            .is_transport()
        );
    }

    #[test]
    fn test_body_preview_truncates() {
        let body = "x".repeat(2000);
        assert_eq!(body_preview(&body).len(), BODY_PREVIEW_CHARS);
        assert_eq!(body_preview("short"), "short");
    }
}
