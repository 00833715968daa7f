//! # Provider Key Resolution
//!
//! [`KeyResolver`] maps a token's key identifier to the provider's public
//! key. The HTTP implementation caches the key set for the lifetime the
//! provider advertises. Providers rotate keys ahead of use, so a miss
//! against a cached set forces exactly one refresh before the lookup fails.
//! No retries are attempted on transport failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderValue, CACHE_CONTROL};
use url::Url;

use aurax_core::AuraxError;

use crate::config::JwksConfig;
use crate::jwks::{Jwk, JwkSet};

/// Resolves a key identifier to a provider key.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// request handlers behind an `Arc`.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Return the key with identifier `kid`.
    ///
    /// Fails with [`AuraxError::KeyNotFound`] when the provider publishes no
    /// such key, or [`AuraxError::KeyServiceUnavailable`] when the key set
    /// cannot be obtained.
    async fn resolve(&self, kid: &str) -> Result<Jwk, AuraxError>;
}

/// Resolver over a fixed key set (offline use, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticKeyResolver {
    keys: JwkSet,
}

impl StaticKeyResolver {
    /// Serve `keys` unchanged for the resolver's lifetime.
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    /// Load a JWKS document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, AuraxError> {
        let keys: JwkSet = serde_json::from_str(json)
            .map_err(|e| AuraxError::KeyServiceUnavailable(format!("malformed key set: {e}")))?;
        Ok(Self { keys })
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, kid: &str) -> Result<Jwk, AuraxError> {
        self.keys
            .find(kid)
            .cloned()
            .ok_or_else(|| AuraxError::KeyNotFound {
                kid: kid.to_string(),
            })
    }
}

#[derive(Debug)]
struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeySet {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

/// HTTP resolver for the provider's published JWKS endpoint.
#[derive(Debug)]
pub struct JwksResolver {
    http: reqwest::Client,
    url: Url,
    fallback_ttl: Duration,
    cache: RwLock<Option<CachedKeySet>>,
}

impl JwksResolver {
    /// Build a resolver from configuration.
    pub fn new(config: JwksConfig) -> Result<Self, AuraxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuraxError::Internal(format!("http client init failed: {e}")))?;
        Ok(Self {
            http,
            url: config.url,
            fallback_ttl: Duration::from_secs(config.fallback_cache_secs),
            cache: RwLock::new(None),
        })
    }

    /// The endpoint this resolver fetches from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Drop the cached key set.
    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }

    fn fresh_cached(&self) -> Option<Arc<JwkSet>> {
        self.cache
            .read()
            .as_ref()
            .filter(|c| c.is_fresh())
            .map(|c| Arc::clone(&c.keys))
    }

    /// Fetch the key set and replace the cache.
    pub async fn refresh(&self) -> Result<Arc<JwkSet>, AuraxError> {
        let endpoint = format!("GET {}", self.url);
        tracing::debug!(url = %self.url, "fetching provider key set");

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| AuraxError::KeyServiceUnavailable(format!("{endpoint}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            tracing::warn!(status, url = %self.url, "key set endpoint returned an error");
            return Err(AuraxError::KeyServiceUnavailable(format!(
                "{endpoint} returned {status}"
            )));
        }

        let ttl = resp
            .headers()
            .get(CACHE_CONTROL)
            .and_then(max_age)
            .map(Duration::from_secs)
            .unwrap_or(self.fallback_ttl);

        let keys: JwkSet = resp.json().await.map_err(|e| {
            AuraxError::KeyServiceUnavailable(format!("{endpoint}: malformed key set: {e}"))
        })?;
        tracing::info!(
            keys = keys.keys.len(),
            ttl_secs = ttl.as_secs(),
            "provider key set refreshed"
        );

        let keys = Arc::new(keys);
        *self.cache.write() = Some(CachedKeySet {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
            ttl,
        });
        Ok(keys)
    }
}

#[async_trait]
impl KeyResolver for JwksResolver {
    async fn resolve(&self, kid: &str) -> Result<Jwk, AuraxError> {
        if let Some(keys) = self.fresh_cached() {
            if let Some(key) = keys.find(kid) {
                tracing::debug!(kid, "provider key served from cache");
                return Ok(key.clone());
            }
            tracing::debug!(kid, "key id missing from cached set; forcing refresh");
        }

        let keys = self.refresh().await?;
        keys.find(kid).cloned().ok_or_else(|| {
            tracing::warn!(kid, available = ?keys.key_ids(), "provider has no such key");
            AuraxError::KeyNotFound {
                kid: kid.to_string(),
            }
        })
    }
}

/// Extract `max-age` seconds from a `Cache-Control` header value.
fn max_age(value: &HeaderValue) -> Option<u64> {
    let text = value.to_str().ok()?;
    text.split(',').find_map(|directive| {
        let (name, secs) = directive.trim().split_once('=')?;
        if name.trim().eq_ignore_ascii_case("max-age") {
            secs.trim().trim_matches('"').parse().ok()
        } else {
            None
        }
    })
}
