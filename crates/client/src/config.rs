//! Catalog client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CATALOG_API_URL` - Base URL of the catalog service (default: <https://dummyjson.com>)
//! - `CATALOG_PAGE_SIZE` - Products per page, non-zero (default: 6)
//! - `CATALOG_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry event sample rate, 0.0-1.0 (default: 1.0)

use std::num::NonZeroU32;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://dummyjson.com";
const DEFAULT_PAGE_SIZE: &str = "6";
const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog service
    pub api_url: Url,
    /// Fixed page size for product listings
    pub page_size: NonZeroU32,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; error tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment name reported with events
    pub environment: Option<String>,
    /// Fraction of events sent
    pub sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(
            "CATALOG_API_URL",
            &get_env_or_default("CATALOG_API_URL", DEFAULT_API_URL),
        )?;
        let page_size = get_env_or_default("CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)
            .parse::<NonZeroU32>()
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_PAGE_SIZE".to_string(), e.to_string()))?;
        let timeout_secs = get_env_or_default("CATALOG_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Configuration for a catalog service at `api_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// http(s) URL.
    pub fn for_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("CATALOG_API_URL", api_url)?,
            page_size: vitrine_core::query::DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(10),
            sentry: SentryConfig::default(),
        })
    }

    /// Base URL as a string without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string()))?;
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                format!("must be between 0.0 and 1.0 (got {sample_rate})"),
            ));
        }

        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse and check the catalog base URL.
fn parse_api_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_valid() {
        let url = parse_api_url("TEST_VAR", "https://dummyjson.com").unwrap();
        assert_eq!(url.host_str(), Some("dummyjson.com"));
    }

    #[test]
    fn test_parse_api_url_rejects_scheme() {
        let err = parse_api_url("TEST_VAR", "ftp://catalog.test").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_api_url_rejects_garbage() {
        assert!(parse_api_url("TEST_VAR", "not a url").is_err());
    }

    #[test]
    fn test_for_url_defaults() {
        let config = CatalogConfig::for_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.page_size.get(), 6);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = CatalogConfig::for_url("https://gateway.test/catalog").unwrap();
        assert_eq!(config.base_url(), "https://gateway.test/catalog");
    }
}
