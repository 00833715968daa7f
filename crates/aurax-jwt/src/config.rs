//! Key resolver configuration.
//!
//! Defaults point at the production provider endpoint. Override via
//! environment variables or explicit construction for tests.

use url::Url;

/// Production JWKS endpoint of the identity provider.
pub const DEFAULT_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Configuration for fetching the provider key set.
#[derive(Debug, Clone)]
pub struct JwksConfig {
    /// JWKS endpoint.
    pub url: Url,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Cache lifetime used when the response carries no `max-age`.
    pub fallback_cache_secs: u64,
}

impl JwksConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AURAX_JWKS_URL` (default: the provider's production endpoint)
    /// - `AURAX_JWKS_TIMEOUT_SECS` (default: 10)
    /// - `AURAX_JWKS_CACHE_SECS` (default: 3600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("AURAX_JWKS_URL").unwrap_or_else(|_| DEFAULT_JWKS_URL.to_string());
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("AURAX_JWKS_URL".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            timeout_secs: env_u64("AURAX_JWKS_TIMEOUT_SECS").unwrap_or(10),
            fallback_cache_secs: env_u64("AURAX_JWKS_CACHE_SECS").unwrap_or(3600),
        })
    }

    /// Configuration pointing at an arbitrary endpoint, with default timeouts.
    pub fn with_url(url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl("jwks url".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            timeout_secs: 10,
            fallback_cache_secs: 3600,
        })
    }

    /// Configuration for the provider's production endpoint.
    pub fn production() -> Result<Self, ConfigError> {
        Self::with_url(DEFAULT_JWKS_URL)
    }
}

fn env_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
