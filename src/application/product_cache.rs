//! Two-tier cache in front of the upstream product API.
//!
//! Entries are keyed by department, type and search term. Sub-type levels are
//! not part of the key, so every category page under one
//! department/type shares a single product set.

use crate::application::memory_cache::{ttl, MemoryCache};
use crate::domain::{CacheEntry, CacheRepository, Clock, Product, ProductSource, TaxonomyKey};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct KeyParts<'a> {
    dept: Option<&'a str>,
    typ: Option<&'a str>,
    search: &'a str,
}

/// Hard upper bound for one upstream product fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ProductCache {
    source: Arc<dyn ProductSource>,
    remote: Arc<dyn CacheRepository>,
    memory: MemoryCache<Vec<Product>>,
    fetch_timeout: Duration,
}

impl ProductCache {
    pub fn new(
        source: Arc<dyn ProductSource>,
        remote: Arc<dyn CacheRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_ttl(source, remote, clock, ttl::PRODUCTS_SECS)
    }

    pub fn with_ttl(
        source: Arc<dyn ProductSource>,
        remote: Arc<dyn CacheRepository>,
        clock: Arc<dyn Clock>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            source,
            remote,
            memory: MemoryCache::new(ttl_secs, clock),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Stable cache key for a department/type/search combination.
    pub fn cache_key(key: &TaxonomyKey, search_term: &str) -> String {
        let parts = KeyParts {
            dept: key.dept.as_deref(),
            typ: key.typ.as_deref(),
            search: search_term.trim(),
        };
        // serializing borrowed strings into a String cannot fail
        let json = serde_json::to_string(&parts).unwrap_or_default();
        format!("products:{}", json)
    }

    /// Get the raw product set for `key`, going upstream only on a miss.
    ///
    /// # Errors
    ///
    /// Returns the upstream error when both tiers miss and the fetch fails.
    /// Cache tier failures are logged and treated as misses.
    pub async fn get_cached_products(&self, key: &TaxonomyKey, search_term: &str) -> Result<Vec<Product>> {
        let cache_key = Self::cache_key(key, search_term);

        if let Some(products) = self.memory.get(&cache_key) {
            debug!("Product memory cache hit: {}", cache_key);
            record("memory", "hit");
            return Ok(products);
        }

        if let Some(entry) = self.read_remote(&cache_key).await {
            debug!("Product remote cache hit: {}", cache_key);
            record("remote", "hit");
            let products = entry.data.clone();
            self.memory.insert_entry(&cache_key, entry);
            return Ok(products);
        }

        info!("Product cache miss, fetching from upstream: {}", cache_key);
        record("upstream", "miss");

        let products = tokio::time::timeout(self.fetch_timeout, self.source.fetch_products(key))
            .await
            .map_err(|_| anyhow!("product fetch timed out after {:?}", self.fetch_timeout))
            .and_then(|fetched| fetched)
            .with_context(|| format!("Failed to fetch products for {}", cache_key))?;

        self.populate(&cache_key, products.clone()).await;
        Ok(products)
    }

    /// Drop every in-memory product set. Remote entries age out on their TTL.
    pub fn invalidate_all(&self) {
        let dropped = self.memory.len();
        self.memory.clear();
        info!("Invalidated {} in-memory product sets", dropped);
    }

    async fn read_remote(&self, cache_key: &str) -> Option<CacheEntry<Vec<Product>>> {
        let raw = match self.remote.get(cache_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Remote cache read failed for {}: {}", cache_key, e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<Vec<Product>>>(&raw) {
            Ok(entry) if self.memory.is_fresh(&entry) => Some(entry),
            Ok(_) => {
                debug!("Remote product entry expired: {}", cache_key);
                None
            }
            Err(e) => {
                warn!("Discarding unreadable product cache entry {}: {}", cache_key, e);
                None
            }
        }
    }

    async fn populate(&self, cache_key: &str, products: Vec<Product>) {
        let entry = self.memory.insert(cache_key, products);

        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self.remote.set(cache_key, &json, self.memory.ttl_secs()).await {
                    warn!("Failed to write products to remote cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize product cache entry: {}", e),
        }
    }
}

fn record(tier: &'static str, outcome: &'static str) {
    metrics::counter!("cache_operations_total", "cache" => "products", "tier" => tier, "outcome" => outcome)
        .increment(1);
}
