//! Taxonomy store with tiered caching and bounded upstream retry.
//!
//! Lookup order:
//! 1. Process-local memory cache
//! 2. Remote cache (Redis)
//! 3. Upstream taxonomy API, retried with a fixed delay
//!
//! Failure never propagates: once the retry budget is spent the store hands
//! back an empty list, which callers treat as "no data available".

use crate::application::memory_cache::{ttl, MemoryCache};
use crate::domain::{CacheEntry, CacheRepository, Clock, TaxonomyItem, TaxonomySource};
use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, error, info, warn};

/// Remote cache key holding the serialized taxonomy entry.
pub const TAXONOMY_CACHE_KEY: &str = "storefront:taxonomy:v1";

/// Memory cache key (the store only ever holds one list).
const MEMORY_KEY: &str = "taxonomy";

/// Bounded retry settings for upstream fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub attempts: usize,
    /// Upper bound for a single attempt
    pub attempt_timeout: Duration,
    /// Fixed pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            attempt_timeout: Duration::from_secs(5),
            backoff: Duration::from_secs(1),
        }
    }
}

pub struct TaxonomyStore {
    source: Arc<dyn TaxonomySource>,
    remote: Arc<dyn CacheRepository>,
    memory: MemoryCache<Vec<TaxonomyItem>>,
    retry: RetryPolicy,
}

impl TaxonomyStore {
    pub fn new(
        source: Arc<dyn TaxonomySource>,
        remote: Arc<dyn CacheRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_settings(source, remote, clock, ttl::TAXONOMY_SECS, RetryPolicy::default())
    }

    pub fn with_settings(
        source: Arc<dyn TaxonomySource>,
        remote: Arc<dyn CacheRepository>,
        clock: Arc<dyn Clock>,
        ttl_secs: u64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            remote,
            memory: MemoryCache::new(ttl_secs, clock),
            retry,
        }
    }

    /// Return the full taxonomy list, or an empty list if none is available.
    pub async fn fetch_taxonomy_data(&self) -> Vec<TaxonomyItem> {
        if let Some(items) = self.memory.get(MEMORY_KEY) {
            debug!("Taxonomy memory cache hit ({} nodes)", items.len());
            record("memory", "hit");
            return items;
        }

        if let Some(entry) = self.read_remote().await {
            debug!("Taxonomy remote cache hit ({} nodes)", entry.data.len());
            record("remote", "hit");
            let items = entry.data.clone();
            self.memory.insert_entry(MEMORY_KEY, entry);
            return items;
        }

        info!("Taxonomy cache miss, fetching from upstream");
        record("upstream", "miss");

        match self.fetch_with_retry().await {
            Ok(items) if items.is_empty() => {
                warn!("Upstream returned an empty taxonomy, not caching");
                Vec::new()
            }
            Ok(items) => {
                self.populate(&items).await;
                items
            }
            Err(e) => {
                error!(
                    "Taxonomy fetch failed after {} attempts: {:#}",
                    self.retry.attempts, e
                );
                metrics::counter!("upstream_fetch_total", "resource" => "taxonomy", "outcome" => "exhausted")
                    .increment(1);
                Vec::new()
            }
        }
    }

    /// Drop both cache tiers so the next read goes upstream.
    pub async fn invalidate(&self) {
        self.memory.clear();
        if let Err(e) = self.remote.delete(TAXONOMY_CACHE_KEY).await {
            warn!("Failed to delete taxonomy from remote cache: {}", e);
        }
        info!("Invalidated taxonomy cache");
    }

    async fn fetch_with_retry(&self) -> anyhow::Result<Vec<TaxonomyItem>> {
        let attempts = AtomicUsize::new(0);
        let attempt = &attempts;
        let strategy =
            FixedInterval::new(self.retry.backoff).take(self.retry.attempts.saturating_sub(1));
        let timeout = self.retry.attempt_timeout;

        Retry::spawn(strategy, || async move {
            let n = attempt.fetch_add(1, Ordering::Relaxed) + 1;
            match tokio::time::timeout(timeout, self.source.fetch_taxonomy()).await {
                Ok(Ok(items)) => {
                    metrics::counter!("upstream_fetch_total", "resource" => "taxonomy", "outcome" => "ok")
                        .increment(1);
                    Ok(items)
                }
                Ok(Err(e)) => {
                    warn!("Taxonomy fetch attempt {} failed: {:#}", n, e);
                    metrics::counter!("upstream_fetch_total", "resource" => "taxonomy", "outcome" => "error")
                        .increment(1);
                    Err(e)
                }
                Err(_) => {
                    warn!("Taxonomy fetch attempt {} timed out after {:?}", n, timeout);
                    metrics::counter!("upstream_fetch_total", "resource" => "taxonomy", "outcome" => "timeout")
                        .increment(1);
                    Err(anyhow!("taxonomy fetch timed out after {:?}", timeout))
                }
            }
        })
        .await
    }

    async fn read_remote(&self) -> Option<CacheEntry<Vec<TaxonomyItem>>> {
        let raw = match self.remote.get(TAXONOMY_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Remote cache read failed for taxonomy: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<Vec<TaxonomyItem>>>(&raw) {
            Ok(entry) if !entry.data.is_empty() && self.memory.is_fresh(&entry) => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!("Discarding unreadable taxonomy cache entry: {}", e);
                None
            }
        }
    }

    async fn populate(&self, items: &[TaxonomyItem]) {
        let entry = self.memory.insert(MEMORY_KEY, items.to_vec());

        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self
                    .remote
                    .set(TAXONOMY_CACHE_KEY, &json, self.memory.ttl_secs())
                    .await
                {
                    warn!("Failed to write taxonomy to remote cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize taxonomy cache entry: {}", e),
        }
    }
}

fn record(tier: &'static str, outcome: &'static str) {
    metrics::counter!("cache_operations_total", "cache" => "taxonomy", "tier" => tier, "outcome" => outcome)
        .increment(1);
}
