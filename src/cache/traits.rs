//! Cache capability traits
//!
//! Every backend implements [`Cache`]. Backends that stamp entries with an expiration
//! time also implement [`LifetimeCache`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheEntry, CacheStatistics};
use crate::error::CacheResult;

/// Uniform cache operations over interchangeable backends.
///
/// `Ok(None)` from a lookup is a miss. `Err` means the backend itself failed,
/// so callers can always tell "not cached" apart from "cache unavailable".
#[async_trait]
pub trait Cache<K, V>: Send + Sync {
    /// Looks up a live value. Expired entries read as a miss.
    async fn get(&self, key: &K) -> CacheResult<Option<V>>;

    /// Looks up several keys. Missing or expired keys are left out of the result.
    async fn get_all(&self, keys: &[K]) -> CacheResult<HashMap<K, V>>;

    /// Inserts or overwrites a value.
    async fn put(&self, key: K, value: V) -> CacheResult<()>;

    /// Inserts every pair, as if by sequential `put`. Not atomic.
    async fn put_all(&self, entries: HashMap<K, V>) -> CacheResult<()>;

    /// Removes a key. Removing a missing key is a no-op.
    async fn delete(&self, key: &K) -> CacheResult<()>;

    async fn delete_all(&self, keys: &[K]) -> CacheResult<()>;

    /// Removes every entry.
    async fn clear(&self) -> CacheResult<()>;

    /// Number of structurally present entries, including expired ones not yet purged.
    async fn size(&self) -> CacheResult<usize>;

    /// Backend-defined statistics snapshot.
    async fn statistics(&self) -> CacheResult<CacheStatistics>;
}

/// A cache whose entries carry an explicit lifetime.
///
/// `put`/`put_all` from [`Cache`] use the backend's default lifetime.
#[async_trait]
pub trait LifetimeCache<K, V>: Cache<K, V> {
    /// Inserts a value that expires `lifetime` from now.
    ///
    /// `Duration::ZERO` stores an entry that is already expired, which callers use as
    /// "always revalidate" together with [`LifetimeCache::get_cache_entry`].
    async fn put_with_lifetime(&self, key: K, value: V, lifetime: Duration) -> CacheResult<()>;

    /// Inserts every pair with one shared expiration time computed once for the batch.
    async fn put_all_with_lifetime(
        &self,
        entries: HashMap<K, V>,
        lifetime: Duration,
    ) -> CacheResult<()>;

    /// Returns the raw entry even when it has expired.
    async fn get_cache_entry(&self, key: &K) -> CacheResult<Option<CacheEntry<V>>>;
}
