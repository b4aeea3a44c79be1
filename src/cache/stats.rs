//! Cache Statistics Module
//!
//! Counters kept by the in-process backend and the opaque statistics value every
//! backend returns.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Hit, miss and eviction counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or only an expired entry
    pub misses: u64,
    /// Entries evicted due to LRU policy
    pub evictions: u64,
    /// Expired entries purged by cleanup
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Cache Statistics ==
/// Backend-defined statistics snapshot.
///
/// The coordinator forwards this value without inspecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", content = "stats", rename_all = "snake_case")]
pub enum CacheStatistics {
    /// The backend does not keep statistics
    Unsupported,
    /// Counters of an in-process cache
    InProcess(CacheStats),
    /// Counters reported by a cache node
    Remote(CacheStats),
}

impl CacheStatistics {
    /// The counters, when the backend keeps any.
    pub fn counters(&self) -> Option<&CacheStats> {
        match self {
            CacheStatistics::Unsupported => None,
            CacheStatistics::InProcess(stats) | CacheStatistics::Remote(stats) => Some(stats),
        }
    }
}
