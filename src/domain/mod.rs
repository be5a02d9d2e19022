//! Domain layer - Core catalog entities and repository traits.
//!
//! This module defines the domain model for the storefront catalog gateway,
//! following clean architecture principles. It contains:
//! - Repository traits that define data access interfaces
//! - Taxonomy and product entities
//! - Cache entry and clock abstractions shared by the cache tiers

pub mod product;
pub mod taxonomy;

pub use product::{Product, Variation};
pub use taxonomy::{BreadcrumbItem, CategoryView, TaxonomyItem, EMPTY_LEVEL, LEVEL_COUNT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

/// Department/type pair used to request products from the upstream API.
///
/// Only the two shallowest taxonomy levels take part; deeper levels of the
/// same department and type share one product set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyKey {
    pub dept: Option<String>,
    pub typ: Option<String>,
}

impl TaxonomyKey {
    pub fn new(dept: Option<&str>, typ: Option<&str>) -> Self {
        Self {
            dept: dept.map(str::to_string),
            typ: typ.map(str::to_string),
        }
    }
}

impl From<&TaxonomyItem> for TaxonomyKey {
    fn from(item: &TaxonomyItem) -> Self {
        Self {
            dept: item.dept.clone(),
            typ: item.typ.clone(),
        }
    }
}

/// A cached value together with the time it was written.
///
/// The same shape is stored in the process-local tier and, serialized as
/// JSON, in the remote tier, so freshness is judged identically in both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Write time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// An entry is fresh while strictly less than `ttl_secs` old.
    pub fn is_fresh(&self, now_millis: i64, ttl_secs: u64) -> bool {
        now_millis.saturating_sub(self.timestamp) < (ttl_secs as i64).saturating_mul(1000)
    }
}

/// Source of "now" for cache freshness decisions.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Upstream source of the flat taxonomy list.
///
/// # Implementations
///
/// See `infrastructure::storefront_client::StorefrontApiClient`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    /// Fetch every taxonomy node in one request.
    ///
    /// # Errors
    ///
    /// - Returns error on transport failure or a non-2xx status
    /// - Returns error if the body is not a JSON array of taxonomy nodes
    async fn fetch_taxonomy(&self) -> anyhow::Result<Vec<TaxonomyItem>>;
}

/// Upstream source of raw products for a department/type.
///
/// # Implementations
///
/// See `infrastructure::storefront_client::StorefrontApiClient`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch all products under the given department and type.
    ///
    /// Unset levels are omitted from the upstream query.
    ///
    /// # Errors
    ///
    /// - Returns error on transport failure or a non-2xx status
    /// - Returns error if the body is not a JSON array
    async fn fetch_products(&self, key: &TaxonomyKey) -> anyhow::Result<Vec<Product>>;
}

/// Repository trait for the shared remote cache tier.
///
/// The remote cache is used strictly as a cache, never as a system of record:
/// callers must always be able to fall back to the upstream API.
///
/// # Implementations
///
/// See `infrastructure::redis::RedisRepository` for the Redis implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Retrieve a cached value by key.
    ///
    /// Returns `Ok(None)` on a miss; never errors on a miss.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store a value with a time-to-live in seconds.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_freshness_boundary() {
        let entry = CacheEntry::new((), 1_000_000);
        let ttl = 60;

        assert!(entry.is_fresh(1_000_000, ttl));
        assert!(entry.is_fresh(1_000_000 + 59_999, ttl));
        assert!(!entry.is_fresh(1_000_000 + 60_000, ttl));
        assert!(!entry.is_fresh(1_000_000 + 61_000, ttl));
    }

    #[test]
    fn test_taxonomy_key_serializes_stably() {
        let key = TaxonomyKey::new(Some("Shoes"), None);
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            r#"{"dept":"Shoes","typ":null}"#
        );
    }
}
