//! Cache Entry Module
//!
//! Pairs a cached value with the absolute time at which it stops being served.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached value and its absolute expiration timestamp.
///
/// Entries are never mutated in place. Refreshing a key means storing a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    value: V,
    /// Expiration timestamp (Unix milliseconds)
    expiration_time: u64,
}

impl<V> CacheEntry<V> {
    // == Constructors ==
    /// Creates an entry expiring at the given absolute time (Unix milliseconds).
    pub fn new(value: V, expiration_time: u64) -> Self {
        Self {
            value,
            expiration_time,
        }
    }

    /// Creates an entry that expires `lifetime` from now.
    ///
    /// A zero lifetime produces an entry that is already expired, which callers use
    /// to force revalidation on every read.
    pub fn with_lifetime(value: V, lifetime: Duration) -> Self {
        Self::new(value, expiration_from_now(lifetime))
    }

    /// The cached value, regardless of expiration.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the value.
    pub fn into_value(self) -> V {
        self.value
    }

    /// Absolute expiration time in Unix milliseconds.
    pub fn expiration_time(&self) -> u64 {
        self.expiration_time
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Checks expiration against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expiration_time
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expiration_time.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Absolute expiration time for a lifetime starting now.
pub fn expiration_from_now(lifetime: Duration) -> u64 {
    current_timestamp_ms().saturating_add(lifetime.as_millis() as u64)
}
