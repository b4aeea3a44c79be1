//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies. The remote cache backend
//! decodes the same types on the client side.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, CacheStats};

/// Response body for GET /entries/:key
///
/// The entry is returned as stored, even when it has expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEntryResponse {
    /// The requested key
    pub key: String,
    /// The stored entry
    pub entry: CacheEntry<serde_json::Value>,
}

impl GetEntryResponse {
    pub fn new(key: impl Into<String>, entry: CacheEntry<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            entry,
        }
    }
}

/// Response body for PUT /entries/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutEntryResponse {
    /// Success message
    pub message: String,
    /// The key that was stored
    pub key: String,
    /// Expiration time of the stored entry (Unix milliseconds)
    pub expiration_time: u64,
}

impl PutEntryResponse {
    pub fn new(key: impl Into<String>, expiration_time: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
            expiration_time,
        }
    }
}

/// Response body for DELETE /entries/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for DELETE /entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for GET /size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeResponse {
    /// Structurally present entries, expired ones included
    pub size: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of expired entries purged
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

impl From<StatsResponse> for CacheStats {
    fn from(response: StatsResponse) -> Self {
        Self {
            hits: response.hits,
            misses: response.misses,
            evictions: response.evictions,
            expirations: response.expirations,
            total_entries: response.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
