//! LRU Cache Backend
//!
//! Bounded in-memory cache without lifetimes or statistics.

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{Cache, CacheStatistics, LruMap};
use crate::error::CacheResult;

// == LRU Cache ==
/// Reference backend: a fixed-capacity [`LruMap`] behind one mutex.
///
/// Every operation, batch forms included, runs under a single lock acquisition, so
/// concurrent callers observe some serial order and `get_all` never sees a torn state.
#[derive(Debug)]
pub struct LruCache<K, V> {
    inner: Mutex<LruMap<K, V>>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruMap::new(capacity)),
        }
    }

    pub async fn capacity(&self) -> usize {
        self.inner.lock().await.capacity()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> CacheResult<Option<V>> {
        let mut map = self.inner.lock().await;
        Ok(map.get(key).cloned())
    }

    async fn get_all(&self, keys: &[K]) -> CacheResult<HashMap<K, V>> {
        let mut map = self.inner.lock().await;
        let found = keys
            .iter()
            .filter_map(|key| map.get(key).map(|value| (key.clone(), value.clone())))
            .collect();
        Ok(found)
    }

    async fn put(&self, key: K, value: V) -> CacheResult<()> {
        let mut map = self.inner.lock().await;
        if map.insert(key, value).is_some() {
            debug!(capacity = map.capacity(), "LRU cache evicted least recently used entry");
        }
        Ok(())
    }

    async fn put_all(&self, entries: HashMap<K, V>) -> CacheResult<()> {
        let mut map = self.inner.lock().await;
        let mut evicted = 0usize;
        for (key, value) in entries {
            if map.insert(key, value).is_some() {
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, "LRU cache evicted entries during batch insert");
        }
        Ok(())
    }

    async fn delete(&self, key: &K) -> CacheResult<()> {
        self.inner.lock().await.remove(key);
        Ok(())
    }

    async fn delete_all(&self, keys: &[K]) -> CacheResult<()> {
        let mut map = self.inner.lock().await;
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.inner.lock().await.clear();
        Ok(())
    }

    async fn size(&self) -> CacheResult<usize> {
        Ok(self.inner.lock().await.len())
    }

    async fn statistics(&self) -> CacheResult<CacheStatistics> {
        Ok(CacheStatistics::Unsupported)
    }
}
