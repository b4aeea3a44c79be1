//! Remote Cache Backend
//!
//! Lifetime-aware cache kept on a cache node and reached over HTTP.
//!
//! Entries cross the wire as JSON-encoded [`CacheEntry`] values. The node stores them
//! as-is, and this client applies the expiration check, so expired entries remain
//! reachable through [`LifetimeCache::get_cache_entry`].

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::entry::{current_timestamp_ms, expiration_from_now};
use crate::cache::{Cache, CacheEntry, CacheStatistics, CacheStats, LifetimeCache};
use crate::error::{CacheError, CacheResult};
use crate::models::{
    key_to_segment, validate_key, ErrorResponse, GetEntryResponse, PutEntryRequest, SizeResponse,
    StatsResponse,
};

// == Remote Cache ==
/// HTTP client for a cache node.
///
/// Keys are rendered with `Display` and sent as a single percent-encoded path segment,
/// so document URIs are valid keys.
#[derive(Debug, Clone)]
pub struct RemoteCache<K, V> {
    client: Client,
    base_url: Url,
    /// Lifetime applied by `put` and `put_all`
    default_lifetime: Duration,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> RemoteCache<K, V>
where
    K: Display,
    V: Serialize + DeserializeOwned,
{
    // == Constructors ==
    /// Creates a client for the cache node at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &str, default_lifetime: Duration) -> CacheResult<Self> {
        Self::with_client(Client::new(), base_url, default_lifetime)
    }

    /// Creates a client reusing an existing `reqwest::Client` (timeouts, pooling).
    pub fn with_client(
        client: Client,
        base_url: &str,
        default_lifetime: Duration,
    ) -> CacheResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheError::Transport(format!("invalid cache node URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::Transport(format!(
                "cache node URL cannot be a base: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            default_lifetime,
            _marker: PhantomData,
        })
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    // == URL Helpers ==
    fn endpoint(&self, segments: &[&str]) -> CacheResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::Internal("cache node URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a single entry. Keys the node would reject fail here with `InvalidKey`.
    fn entry_url(&self, key: &K) -> CacheResult<Url> {
        let key = key.to_string();
        if let Some(error_msg) = validate_key(&key) {
            return Err(CacheError::InvalidKey(error_msg));
        }
        self.endpoint(&["entries", &key_to_segment(&key)])
    }

    // == Wire Operations ==
    async fn fetch_entry(&self, key: &K) -> CacheResult<Option<CacheEntry<V>>> {
        let response = self.client.get(self.entry_url(key)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = checked(response).await?.bytes().await?;
        let envelope: GetEntryResponse = serde_json::from_slice(&body)?;
        let expiration_time = envelope.entry.expiration_time();
        let value: V = serde_json::from_value(envelope.entry.into_value())?;
        Ok(Some(CacheEntry::new(value, expiration_time)))
    }

    async fn store_entry(&self, key: &K, value: &V, expiration_time: u64) -> CacheResult<()> {
        let request = PutEntryRequest {
            entry: CacheEntry::new(serde_json::to_value(value)?, expiration_time),
        };

        let response = self
            .client
            .put(self.entry_url(key)?)
            .json(&request)
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn remove_entry(&self, key: &K) -> CacheResult<()> {
        let response = self.client.delete(self.entry_url(key)?).send().await?;
        checked(response).await?;
        Ok(())
    }
}

/// Maps a 400 from the node to `InvalidKey`; other failure statuses are transport errors.
async fn checked(response: Response) -> CacheResult<Response> {
    if response.status() == StatusCode::BAD_REQUEST {
        let body = response.text().await?;
        return Err(rejection(&body));
    }
    Ok(response.error_for_status()?)
}

fn rejection(body: &str) -> CacheError {
    let reason = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string());
    CacheError::InvalidKey(reason)
}

#[async_trait]
impl<K, V> Cache<K, V> for RemoteCache<K, V>
where
    K: Display + Hash + Eq + Clone + Send + Sync,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &K) -> CacheResult<Option<V>> {
        let entry = self.fetch_entry(key).await?;
        Ok(entry
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::into_value))
    }

    async fn get_all(&self, keys: &[K]) -> CacheResult<HashMap<K, V>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.fetch_entry(key).await? {
                if !entry.is_expired_at(current_timestamp_ms()) {
                    found.insert(key.clone(), entry.into_value());
                }
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
        self.remove_entry(key).await
    }

    async fn delete_all(&self, keys: &[K]) -> CacheResult<()> {
        for key in keys {
            self.remove_entry(key).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.client
            .delete(self.endpoint(&["entries"])?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn size(&self) -> CacheResult<usize> {
        let body = self
            .client
            .get(self.endpoint(&["size"])?)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let size: SizeResponse = serde_json::from_slice(&body)?;
        Ok(size.size)
    }

    async fn statistics(&self) -> CacheResult<CacheStatistics> {
        let body = self
            .client
            .get(self.endpoint(&["stats"])?)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let stats: StatsResponse = serde_json::from_slice(&body)?;
        Ok(CacheStatistics::Remote(CacheStats::from(stats)))
    }
}

#[async_trait]
impl<K, V> LifetimeCache<K, V> for RemoteCache<K, V>
where
    K: Display + Hash + Eq + Clone + Send + Sync,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    async fn put_with_lifetime(&self, key: K, value: V, lifetime: Duration) -> CacheResult<()> {
        self.store_entry(&key, &value, expiration_from_now(lifetime)).await
    }

    async fn put_all_with_lifetime(
        &self,
        entries: HashMap<K, V>,
        lifetime: Duration,
    ) -> CacheResult<()> {
        let expiration_time = expiration_from_now(lifetime);
        for (key, value) in &entries {
            self.store_entry(key, value, expiration_time).await?;
        }
        debug!(count = entries.len(), "Stored batch on cache node");
        Ok(())
    }

    async fn get_cache_entry(&self, key: &K) -> CacheResult<Option<CacheEntry<V>>> {
        self.fetch_entry(key).await
    }
}
