//! Process-local cache tier.
//!
//! An explicit cache object owned by the service that uses it, constructed
//! once at startup and cleared on demand. Entries are never evicted eagerly;
//! a stale entry is simply ignored (and later overwritten) on read.

use crate::domain::{CacheEntry, Clock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// TTL configuration for the catalog caches.
pub mod ttl {
    /// Product sets by department/type/search (24 hours, both tiers)
    pub const PRODUCTS_SECS: u64 = 86_400;

    /// Full taxonomy list (7 days, both tiers)
    pub const TAXONOMY_SECS: u64 = 7 * 86_400;
}

/// Upper bound on entries per memory cache; the oldest entry is evicted first.
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Keyed in-memory cache with per-read freshness checks.
///
/// Every write prunes expired entries and evicts the oldest ones beyond
/// `max_entries`. Concurrent writers for the same key race; the last write
/// wins.
pub struct MemoryCache<T> {
    ttl_secs: u64,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(ttl_secs, DEFAULT_MAX_ENTRIES, clock)
    }

    pub fn with_capacity(ttl_secs: u64, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_secs,
            max_entries: max_entries.max(1),
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Whether an entry written at `timestamp` is still fresh for this cache.
    pub fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
        entry.is_fresh(self.clock.now_millis(), self.ttl_secs)
    }

    /// Return a clone of the value under `key` if present and fresh.
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(_) => {
                warn!("Memory cache lock poisoned, treating as miss: {}", key);
                return None;
            }
        };
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.data.clone())
    }

    /// Store `value` stamped with the current time.
    pub fn insert(&self, key: &str, value: T) -> CacheEntry<T> {
        let entry = CacheEntry::new(value, self.clock.now_millis());
        self.insert_entry(key, entry.clone());
        entry
    }

    /// Store an entry keeping its original timestamp (used when promoting a
    /// remote hit so it expires when the remote copy would have).
    pub fn insert_entry(&self, key: &str, entry: CacheEntry<T>) {
        let now = self.clock.now_millis();
        match self.entries.write() {
            Ok(mut entries) => {
                entries.retain(|_, existing| existing.is_fresh(now, self.ttl_secs));
                entries.insert(key.to_string(), entry);

                while entries.len() > self.max_entries {
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, e)| e.timestamp)
                        .map(|(k, _)| k.clone());
                    match oldest {
                        Some(oldest) => {
                            debug!("Memory cache full, evicting {}", oldest);
                            entries.remove(&oldest);
                        }
                        None => break,
                    }
                }
            }
            Err(_) => warn!("Memory cache lock poisoned, dropping write: {}", key),
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::Clock;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to.
    #[derive(Debug, Default)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(millis: i64) -> Self {
            Self(AtomicI64::new(millis))
        }

        pub fn advance_secs(&self, secs: i64) {
            self.0.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;

    #[test]
    fn test_ttl_values() {
        assert!(ttl::PRODUCTS_SECS < ttl::TAXONOMY_SECS);
        assert_eq!(ttl::PRODUCTS_SECS, 24 * 60 * 60);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::at(0));
        let cache: MemoryCache<u32> = MemoryCache::new(10, clock.clone());

        cache.insert("k", 7);
        clock.advance_secs(9);
        assert_eq!(cache.get("k"), Some(7));

        clock.advance_secs(2);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_write_prunes_expired_entries() {
        let clock = Arc::new(ManualClock::at(0));
        let cache: MemoryCache<usize> = MemoryCache::new(60, clock.clone());

        for i in 0..50 {
            cache.insert(&format!("search-{}", i), i);
        }
        assert_eq!(cache.len(), 50);

        clock.advance_secs(3 * 24 * 60 * 60);
        cache.insert("search-fresh", 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("search-fresh"), Some(0));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let clock = Arc::new(ManualClock::at(0));
        let cache: MemoryCache<u8> = MemoryCache::with_capacity(3600, 3, clock.clone());

        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            cache.insert(key, i as u8);
            clock.advance_secs(1);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("d"), Some(3));
    }

    #[test]
    fn test_clear_and_remove() {
        let cache: MemoryCache<&'static str> =
            MemoryCache::new(10, Arc::new(ManualClock::at(0)));
        cache.insert("a", "x");
        cache.insert("b", "y");

        cache.remove("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("y"));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_promoted_entry_keeps_timestamp() {
        let clock = Arc::new(ManualClock::at(20_000));
        let cache: MemoryCache<u8> = MemoryCache::new(10, clock.clone());

        cache.insert_entry("k", CacheEntry::new(1, 15_000));
        assert_eq!(cache.get("k"), Some(1));

        clock.advance_secs(5);
        assert_eq!(cache.get("k"), None);
    }
}
