//! In-Process Cache Backend
//!
//! Bounded cache with per-entry lifetimes, LRU eviction and hit/miss statistics.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::entry::{current_timestamp_ms, expiration_from_now};
use crate::cache::{Cache, CacheEntry, CacheStatistics, CacheStats, LifetimeCache, LruMap};
use crate::error::CacheResult;

#[derive(Debug)]
struct State<K, V> {
    /// Entries in access order
    entries: LruMap<K, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V> State<K, V> {
    fn insert(&mut self, key: K, entry: CacheEntry<V>) {
        if self.entries.insert(key, entry).is_some() {
            self.stats.record_eviction();
        }
        self.stats.set_total_entries(self.entries.len());
    }

    /// Looks up a live value, counting the outcome as a hit or miss.
    fn lookup(&mut self, key: &K, now_ms: u64) -> Option<&V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now_ms) => {
                self.stats.record_hit();
                Some(entry.value())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }
}

// == In-Process Cache ==
/// Lifetime-aware cache held in the current process.
///
/// Expired entries stay structurally present until they are evicted by size pressure
/// or purged with [`InProcessCache::cleanup_expired`]. Reads never purge, so
/// [`LifetimeCache::get_cache_entry`] can still hand an expired entry back for
/// revalidation.
#[derive(Debug)]
pub struct InProcessCache<K, V> {
    state: Mutex<State<K, V>>,
    /// Lifetime applied by `put` and `put_all`
    default_lifetime: Duration,
}

impl<K: Hash + Eq + Clone, V> InProcessCache<K, V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` entries.
    ///
    /// # Arguments
    /// * `max_entries` - Number of entries stored before LRU replacement starts
    /// * `default_lifetime` - Lifetime for entries stored without an explicit one
    pub fn new(max_entries: usize, default_lifetime: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                entries: LruMap::new(max_entries),
                stats: CacheStats::new(),
            }),
            default_lifetime,
        }
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    // == Put Entry ==
    /// Stores an entry whose expiration time was stamped by the caller.
    pub async fn put_entry(&self, key: K, entry: CacheEntry<V>) {
        self.state.lock().await.insert(key, entry);
    }

    // == Fetch Entry ==
    /// Returns the raw entry, counting a hit only when it is still live.
    pub async fn fetch_entry(&self, key: &K) -> Option<CacheEntry<V>>
    where
        V: Clone,
    {
        let now = current_timestamp_ms();
        let mut state = self.state.lock().await;

        let entry = state.entries.get(key).cloned();
        match &entry {
            Some(entry) if !entry.is_expired_at(now) => state.stats.record_hit(),
            _ => state.stats.record_miss(),
        }
        entry
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut state = self.state.lock().await;

        let removed = state.entries.retain(|_, entry| !entry.is_expired_at(now));

        state.stats.record_expirations(removed);
        let total = state.entries.len();
        state.stats.set_total_entries(total);
        removed
    }

    // == Stats ==
    /// Returns current counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for InProcessCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> CacheResult<Option<V>> {
        let now = current_timestamp_ms();
        let mut state = self.state.lock().await;
        Ok(state.lookup(key, now).cloned())
    }

    async fn get_all(&self, keys: &[K]) -> CacheResult<HashMap<K, V>> {
        let now = current_timestamp_ms();
        let mut state = self.state.lock().await;

        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = state.lookup(key, now) {
                found.insert(key.clone(), value.clone());
            }
        }
        Ok(found)
    }

    async fn put(&self, key: K, value: V) -> CacheResult<()> {
        self.put_with_lifetime(key, value, self.default_lifetime).await
    }

    async fn put_all(&self, entries: HashMap<K, V>) -> CacheResult<()> {
        self.put_all_with_lifetime(entries, self.default_lifetime).await
    }

    async fn delete(&self, key: &K) -> CacheResult<()> {
        let mut state = self.state.lock().await;
        state.entries.remove(key);
        let total = state.entries.len();
        state.stats.set_total_entries(total);
        Ok(())
    }

    async fn delete_all(&self, keys: &[K]) -> CacheResult<()> {
        let mut state = self.state.lock().await;
        for key in keys {
            state.entries.remove(key);
        }
        let total = state.entries.len();
        state.stats.set_total_entries(total);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.stats.set_total_entries(0);
        Ok(())
    }

    async fn size(&self) -> CacheResult<usize> {
        Ok(self.state.lock().await.entries.len())
    }

    async fn statistics(&self) -> CacheResult<CacheStatistics> {
        Ok(CacheStatistics::InProcess(self.stats().await))
    }
}

#[async_trait]
impl<K, V> LifetimeCache<K, V> for InProcessCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn put_with_lifetime(&self, key: K, value: V, lifetime: Duration) -> CacheResult<()> {
        let entry = CacheEntry::with_lifetime(value, lifetime);
        self.state.lock().await.insert(key, entry);
        Ok(())
    }

    async fn put_all_with_lifetime(
        &self,
        entries: HashMap<K, V>,
        lifetime: Duration,
    ) -> CacheResult<()> {
        let expiration_time = expiration_from_now(lifetime);
        let count = entries.len();

        let mut state = self.state.lock().await;
        for (key, value) in entries {
            state.insert(key, CacheEntry::new(value, expiration_time));
        }
        debug!(count, expiration_time, "Stored batch in in-process cache");
        Ok(())
    }

    async fn get_cache_entry(&self, key: &K) -> CacheResult<Option<CacheEntry<V>>> {
        Ok(self.state.lock().await.entries.get(key).cloned())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const LONG: Duration = Duration::from_secs(300);

    fn cache(max_entries: usize) -> InProcessCache<String, String> {
        InProcessCache::new(max_entries, LONG)
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = cache(100);

        cache.put(s("key1"), s("value1")).await.unwrap();

        assert_eq!(cache.get(&s("key1")).await.unwrap(), Some(s("value1")));
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent_is_miss() {
        let cache = cache(100);
        assert_eq!(cache.get(&s("nonexistent")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = cache(100);

        cache.put(s("key1"), s("value1")).await.unwrap();
        cache.put(s("key1"), s("value2")).await.unwrap();

        assert_eq!(cache.get(&s("key1")).await.unwrap(), Some(s("value2")));
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lifetime_expiration() {
        let cache = cache(100);

        cache
            .put_with_lifetime(s("key1"), s("value1"), Duration::from_millis(200))
            .await
            .unwrap();
        assert!(cache.get(&s("key1")).await.unwrap().is_some());

        sleep(Duration::from_millis(400)).await;

        assert_eq!(cache.get(&s("key1")).await.unwrap(), None);
        // Still structurally present until purged
        assert_eq!(cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_default_lifetime_applies_to_put() {
        let cache = InProcessCache::new(100, Duration::from_millis(200));

        cache.put(s("key1"), s("value1")).await.unwrap();
        assert!(cache.get(&s("key1")).await.unwrap().is_some());

        sleep(Duration::from_millis(400)).await;

        assert_eq!(cache.get(&s("key1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_cache_entry_returns_expired_entry() {
        let cache = cache(100);

        cache
            .put_with_lifetime(s("stale"), s("old"), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(cache.get(&s("stale")).await.unwrap(), None);
        let entry = cache.get_cache_entry(&s("stale")).await.unwrap().unwrap();
        assert!(entry.is_expired());
        assert_eq!(entry.value(), "old");
    }

    #[tokio::test]
    async fn test_put_all_shares_expiration_time() {
        let cache = cache(100);
        let batch: HashMap<String, String> =
            [(s("a"), s("1")), (s("b"), s("2"))].into_iter().collect();

        cache.put_all_with_lifetime(batch, LONG).await.unwrap();

        let a = cache.get_cache_entry(&s("a")).await.unwrap().unwrap();
        let b = cache.get_cache_entry(&s("b")).await.unwrap().unwrap();
        assert_eq!(a.expiration_time(), b.expiration_time());
    }

    #[tokio::test]
    async fn test_get_all_filters_expired() {
        let cache = cache(100);
        cache.put(s("live"), s("1")).await.unwrap();
        cache
            .put_with_lifetime(s("dead"), s("2"), Duration::ZERO)
            .await
            .unwrap();

        let found = cache
            .get_all(&[s("live"), s("dead"), s("missing")])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.get("live"), Some(&s("1")));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = cache(3);

        cache.put(s("key1"), s("value1")).await.unwrap();
        cache.put(s("key2"), s("value2")).await.unwrap();
        cache.put(s("key3"), s("value3")).await.unwrap();
        cache.put(s("key4"), s("value4")).await.unwrap();

        assert_eq!(cache.size().await.unwrap(), 3);
        assert_eq!(cache.get(&s("key1")).await.unwrap(), None);
        assert!(cache.get(&s("key4")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lru_touch_on_get() {
        let cache = cache(3);

        cache.put(s("key1"), s("value1")).await.unwrap();
        cache.put(s("key2"), s("value2")).await.unwrap();
        cache.put(s("key3"), s("value3")).await.unwrap();

        cache.get(&s("key1")).await.unwrap();
        cache.put(s("key4"), s("value4")).await.unwrap();

        assert!(cache.get(&s("key1")).await.unwrap().is_some());
        assert_eq!(cache.get(&s("key2")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_statistics() {
        let cache = cache(1);

        cache.put(s("key1"), s("value1")).await.unwrap();
        cache.get(&s("key1")).await.unwrap(); // hit
        cache.get(&s("nonexistent")).await.unwrap(); // miss
        cache.put(s("key2"), s("value2")).await.unwrap(); // evicts key1

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 1);

        let snapshot = cache.statistics().await.unwrap();
        assert!(matches!(snapshot, CacheStatistics::InProcess(_)));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = cache(100);

        cache
            .put_with_lifetime(s("key1"), s("value1"), Duration::ZERO)
            .await
            .unwrap();
        cache.put(s("key2"), s("value2")).await.unwrap();

        let removed = cache.cleanup_expired().await;

        assert_eq!(removed, 1);
        assert_eq!(cache.size().await.unwrap(), 1);
        assert!(cache.get_cache_entry(&s("key1")).await.unwrap().is_none());
        assert_eq!(cache.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_clear() {
        let cache = cache(100);
        cache.put(s("a"), s("1")).await.unwrap();
        cache.put(s("b"), s("2")).await.unwrap();

        cache.delete(&s("missing")).await.unwrap();
        cache.delete(&s("a")).await.unwrap();
        cache.delete(&s("a")).await.unwrap();
        assert_eq!(cache.get(&s("b")).await.unwrap(), Some(s("2")));

        cache.clear().await.unwrap();
        assert_eq!(cache.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_entry_keeps_caller_expiration() {
        let cache = cache(100);
        cache.put_entry(s("raw"), CacheEntry::new(s("v"), 42)).await;

        let entry = cache.get_cache_entry(&s("raw")).await.unwrap().unwrap();
        assert_eq!(entry.expiration_time(), 42);
        assert_eq!(cache.get(&s("raw")).await.unwrap(), None);
    }
}
