//! API Handlers
//!
//! HTTP request handlers for each cache node endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{Cache, InProcessCache};
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use crate::models::{
    segment_to_key, validate_key, ClearResponse, DeleteResponse, GetEntryResponse,
    HealthResponse, PutEntryRequest, PutEntryResponse, SizeResponse, StatsResponse,
};

/// Entries held by a cache node: encoded values stamped by their clients.
pub type NodeCache = InProcessCache<String, serde_json::Value>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Entry storage, shared with the expiry sweep task
    pub cache: Arc<NodeCache>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: NodeCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let default_lifetime = Duration::from_millis(config.default_lifetime_ms);
        Self::new(InProcessCache::new(config.max_entries, default_lifetime))
    }
}

/// Unescapes the path segment and validates the resulting key.
fn checked_key(segment: String) -> CacheResult<String> {
    let key = segment_to_key(segment);
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidKey(error_msg)),
        None => Ok(key),
    }
}

/// Handler for GET /entries/:key
///
/// Returns the stored entry, expired or not. Clients apply the expiration check.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> CacheResult<Json<GetEntryResponse>> {
    let key = checked_key(key)?;

    match state.cache.fetch_entry(&key).await {
        Some(entry) => Ok(Json(GetEntryResponse::new(key, entry))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /entries/:key
///
/// Stores a client-stamped entry, overwriting any previous one.
pub async fn put_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutEntryRequest>,
) -> CacheResult<Json<PutEntryResponse>> {
    let key = checked_key(key)?;
    let expiration_time = req.entry.expiration_time();

    state.cache.put_entry(key.clone(), req.entry).await;
    debug!(%key, expiration_time, "Stored entry");

    Ok(Json(PutEntryResponse::new(key, expiration_time)))
}

/// Handler for DELETE /entries/:key
///
/// Deleting a missing key succeeds.
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> CacheResult<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    state.cache.delete(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /entries
pub async fn clear_handler(State(state): State<AppState>) -> CacheResult<Json<ClearResponse>> {
    state.cache.clear().await?;
    Ok(Json(ClearResponse::new()))
}

/// Handler for GET /size
pub async fn size_handler(State(state): State<AppState>) -> CacheResult<Json<SizeResponse>> {
    let size = state.cache.size().await?;
    Ok(Json(SizeResponse { size }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(InProcessCache::new(100, Duration::from_secs(300)))
    }

    fn put_request(value: serde_json::Value, expiration_time: u64) -> Json<PutEntryRequest> {
        Json(PutEntryRequest {
            entry: CacheEntry::new(value, expiration_time),
        })
    }

    #[tokio::test]
    async fn test_put_and_get_entry_handler() {
        let state = state();

        let result = put_entry_handler(
            State(state.clone()),
            Path("doc-1".to_string()),
            put_request(json!({"_id": "doc-1"}), u64::MAX),
        )
        .await;
        assert!(result.is_ok());

        let response = get_entry_handler(State(state), Path("doc-1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.entry.value()["_id"], "doc-1");
        assert_eq!(response.entry.expiration_time(), u64::MAX);
    }

    #[tokio::test]
    async fn test_get_returns_expired_entry() {
        let state = state();
        put_entry_handler(
            State(state.clone()),
            Path("old".to_string()),
            put_request(json!(1), 1),
        )
        .await
        .unwrap();

        let response = get_entry_handler(State(state), Path("old".to_string()))
            .await
            .unwrap();
        assert!(response.entry.is_expired());
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_entry_handler(State(state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_entry_handler_is_idempotent() {
        let state = state();
        put_entry_handler(
            State(state.clone()),
            Path("to_delete".to_string()),
            put_request(json!("v"), u64::MAX),
        )
        .await
        .unwrap();

        for _ in 0..2 {
            let result =
                delete_entry_handler(State(state.clone()), Path("to_delete".to_string())).await;
            assert!(result.is_ok());
        }

        let result = get_entry_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clear_and_size_handlers() {
        let state = state();
        for key in ["a", "b"] {
            put_entry_handler(
                State(state.clone()),
                Path(key.to_string()),
                put_request(json!(key), u64::MAX),
            )
            .await
            .unwrap();
        }

        assert_eq!(size_handler(State(state.clone())).await.unwrap().size, 2);
        clear_handler(State(state.clone())).await.unwrap();
        assert_eq!(size_handler(State(state)).await.unwrap().size, 0);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state();
        let _ = get_entry_handler(State(state.clone()), Path("missing".to_string())).await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_invalid_key_is_rejected() {
        let long_key = "x".repeat(crate::cache::MAX_KEY_LENGTH + 1);
        let result = put_entry_handler(
            State(state()),
            Path(long_key),
            put_request(json!("v"), u64::MAX),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_escaped_dot_key_is_stored_under_its_own_name() {
        let state = state();
        put_entry_handler(
            State(state.clone()),
            Path("~..".to_string()),
            put_request(json!("dots"), u64::MAX),
        )
        .await
        .unwrap();

        let response = get_entry_handler(State(state.clone()), Path("~..".to_string()))
            .await
            .unwrap();
        assert_eq!(response.key, "..");
        assert!(state.cache.fetch_entry(&"..".to_string()).await.is_some());
    }
}
