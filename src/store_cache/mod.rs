//! Store Cache Module
//!
//! [`StoreCache`] puts a cache in front of a [`DocumentStore`]:
//! - reads try the cache first and populate it from the store on a miss
//! - writes go to the store first and are cached once the store confirms them
//! - deletes go to the store first and invalidate the cached copy on success
//! - bulk writes cache each item whose individual response reports no error
//!
//! Documents looked up by id and by full URI live under different cache keys.
//! Nothing reconciles the two, so URI-keyed entries are not invalidated by
//! `remove`; pair [`StoreCache::find_any`] with a lifetime-aware cache.

mod policy;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{Cache, LifetimeCache};
use crate::error::{CacheError, Error, Result, StoreError};
use crate::store::{Document, DocumentStore, Params, Response, ID_FIELD, REV_FIELD};

pub use policy::{Plain, Population, WithLifetime};

#[derive(Debug, Clone, Copy)]
enum WriteOp {
    Save,
    Post,
    Update,
}

// == Store Cache ==
/// Cache-aside decorator over a document store.
///
/// The store and the cache are shared with the caller. The cache can be managed
/// directly through [`StoreCache::cache`], and several wrappers may share one cache.
pub struct StoreCache<S, C, P = Plain> {
    store: Arc<S>,
    cache: Arc<C>,
    policy: P,
}

impl<S, C, P: Clone> Clone for StoreCache<S, C, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            policy: self.policy.clone(),
        }
    }
}

impl<S, C> StoreCache<S, C, Plain>
where
    S: DocumentStore,
    C: Cache<String, Document>,
{
    /// Wraps `store`, populating `cache` with plain puts.
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self {
            store,
            cache,
            policy: Plain,
        }
    }
}

impl<S, C> StoreCache<S, C, WithLifetime>
where
    S: DocumentStore,
    C: LifetimeCache<String, Document>,
{
    /// Wraps `store`, caching every document for `lifetime` from the moment it is
    /// cached. `Duration::ZERO` caches documents already expired.
    pub fn with_lifetime(store: Arc<S>, cache: Arc<C>, lifetime: Duration) -> Self {
        Self {
            store,
            cache,
            policy: WithLifetime::new(lifetime),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.policy.lifetime()
    }
}

impl<S, C, P> StoreCache<S, C, P>
where
    S: DocumentStore,
    C: Cache<String, Document>,
    P: Population<C>,
{
    /// The shared cache, for inspection and manual invalidation.
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn db_uri(&self) -> &str {
        self.store.db_uri()
    }

    // == Reads ==

    /// Fetches a document by id, from the cache when possible.
    pub async fn find<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        if let Some(doc) = self.cached(id).await? {
            return decode(doc);
        }

        let doc = self.store.find(id).await.map_err(|e| store_failure(id, e))?;
        self.populate(id.to_string(), doc.clone()).await?;
        decode(doc)
    }

    /// Like [`StoreCache::find`], passing `params` to the store on a miss.
    ///
    /// The cache is keyed by id only, so a cached document is returned whatever
    /// revision `params` asks for.
    pub async fn find_with_params<T: DeserializeOwned>(
        &self,
        id: &str,
        params: &Params,
    ) -> Result<T> {
        if let Some(doc) = self.cached(id).await? {
            return decode(doc);
        }

        let doc = self
            .store
            .find_with_params(id, params)
            .await
            .map_err(|e| store_failure(id, e))?;
        self.populate(id.to_string(), doc.clone()).await?;
        decode(doc)
    }

    /// Fetches a document by its full URI, cached under that URI.
    pub async fn find_any<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        if let Some(doc) = self.cached(uri).await? {
            return decode(doc);
        }

        let doc = self.store.find_any(uri).await.map_err(|e| store_failure(uri, e))?;
        self.populate(uri.to_string(), doc.clone()).await?;
        decode(doc)
    }

    /// True when the id is cached and live, otherwise asks the store.
    pub async fn contains(&self, id: &str) -> Result<bool> {
        if self.cached(id).await?.is_some() {
            return Ok(true);
        }
        self.store.contains(id).await.map_err(|e| store_failure(id, e))
    }

    // == Writes ==

    /// Creates or updates a document, caching it once the store accepts it.
    pub async fn save<T: Serialize>(&self, obj: &T) -> Result<Response> {
        self.write_through(obj, WriteOp::Save, None).await
    }

    pub async fn save_with_quorum<T: Serialize>(&self, obj: &T, quorum: u32) -> Result<Response> {
        self.write_through(obj, WriteOp::Save, Some(quorum)).await
    }

    /// Creates a new document.
    pub async fn post<T: Serialize>(&self, obj: &T) -> Result<Response> {
        self.write_through(obj, WriteOp::Post, None).await
    }

    pub async fn post_with_quorum<T: Serialize>(&self, obj: &T, quorum: u32) -> Result<Response> {
        self.write_through(obj, WriteOp::Post, Some(quorum)).await
    }

    /// Updates an existing document. The object must carry `_id` and the current `_rev`.
    pub async fn update<T: Serialize>(&self, obj: &T) -> Result<Response> {
        self.write_through(obj, WriteOp::Update, None).await
    }

    pub async fn update_with_quorum<T: Serialize>(
        &self,
        obj: &T,
        quorum: u32,
    ) -> Result<Response> {
        self.write_through(obj, WriteOp::Update, Some(quorum)).await
    }

    // == Deletes ==

    /// Deletes the document the object identifies, then drops its cached copy.
    pub async fn remove<T: Serialize>(&self, obj: &T) -> Result<Response> {
        let doc = encode(obj)?;
        let response = self
            .store
            .remove(&doc)
            .await
            .map_err(|e| store_failure("remove", e))?;

        self.invalidate(&response.id).await?;
        Ok(response)
    }

    /// Deletes a document by id and revision, then drops its cached copy.
    pub async fn remove_by_id(&self, id: &str, rev: &str) -> Result<Response> {
        let response = self
            .store
            .remove_by_id(id, rev)
            .await
            .map_err(|e| store_failure(id, e))?;

        self.invalidate(id).await?;
        Ok(response)
    }

    // == Bulk ==

    /// Writes a batch in one store call and caches the items that succeeded.
    ///
    /// Failed items are reported through their [`Response::error`] and leave the
    /// cache untouched, including any copy cached before the call.
    pub async fn bulk<T: Serialize>(&self, objs: &[T]) -> Result<Vec<Response>> {
        let docs = objs.iter().map(encode).collect::<Result<Vec<_>>>()?;
        let responses = self
            .store
            .bulk(&docs)
            .await
            .map_err(|e| store_failure("bulk", e))?;

        if responses.len() != docs.len() {
            warn!(
                sent = docs.len(),
                received = responses.len(),
                "Bulk response count does not match request"
            );
        }

        let mut confirmed = HashMap::new();
        for (mut doc, response) in docs.into_iter().zip(&responses) {
            if !response.is_ok() {
                debug!(id = %response.id, error = ?response.error, "Bulk item rejected");
                continue;
            }
            stamp(&mut doc, response);
            confirmed.insert(response.id.clone(), doc);
        }

        let count = confirmed.len();
        if count > 0 {
            self.populate_batch(confirmed).await?;
        }
        debug!(count, total = responses.len(), "Cached bulk write results");
        Ok(responses)
    }

    // == Helpers ==

    async fn cached(&self, key: &str) -> Result<Option<Document>> {
        match self.cache.get(&key.to_string()).await {
            Ok(Some(doc)) => {
                debug!(%key, "Cache hit");
                Ok(Some(doc))
            }
            Ok(None) => {
                debug!(%key, "Cache miss");
                Ok(None)
            }
            Err(CacheError::InvalidKey(reason)) => {
                debug!(%key, %reason, "Key not cacheable, reading from store");
                Ok(None)
            }
            Err(err) => {
                warn!(%key, error = %err, "Cache lookup failed");
                Err(err.into())
            }
        }
    }

    /// Caches a confirmed document. On failure any older copy under `key` is dropped
    /// so it cannot be served in place of what the store now holds.
    async fn populate(&self, key: String, doc: Document) -> Result<()> {
        match self.policy.populate(&*self.cache, key.clone(), doc).await {
            Ok(()) => {
                debug!(%key, "Populated cache");
                Ok(())
            }
            Err(CacheError::InvalidKey(reason)) => {
                debug!(%key, %reason, "Key not cacheable, skipping population");
                Ok(())
            }
            Err(err) => {
                warn!(%key, error = %err, "Failed to populate cache");
                if let Err(cleanup) = self.cache.delete(&key).await {
                    warn!(%key, error = %cleanup, "Failed to drop stale cached copy");
                }
                Err(err.into())
            }
        }
    }

    async fn populate_batch(&self, docs: HashMap<String, Document>) -> Result<()> {
        let keys: Vec<String> = docs.keys().cloned().collect();
        match self.policy.populate_all(&*self.cache, docs.clone()).await {
            Ok(()) => Ok(()),
            // One uncacheable key fails the batch; cache the rest one by one
            Err(CacheError::InvalidKey(_)) => {
                for (key, doc) in docs {
                    self.populate(key, doc).await?;
                }
                Ok(())
            }
            Err(err) => {
                warn!(count = keys.len(), error = %err, "Failed to populate cache with batch");
                if let Err(cleanup) = self.cache.delete_all(&keys).await {
                    warn!(error = %cleanup, "Failed to drop stale cached copies");
                }
                Err(err.into())
            }
        }
    }

    /// Drops the cached copy of a deleted document.
    async fn invalidate(&self, key: &str) -> Result<()> {
        match self.cache.delete(&key.to_string()).await {
            Ok(()) | Err(CacheError::InvalidKey(_)) => {
                debug!(%key, "Invalidated cached document");
                Ok(())
            }
            Err(err) => {
                warn!(%key, error = %err, "Failed to invalidate cached document");
                Err(err.into())
            }
        }
    }

    async fn write_through<T: Serialize>(
        &self,
        obj: &T,
        op: WriteOp,
        quorum: Option<u32>,
    ) -> Result<Response> {
        let mut doc = encode(obj)?;
        let written = match op {
            WriteOp::Save => self.store.save(&doc, quorum).await,
            WriteOp::Post => self.store.post(&doc, quorum).await,
            WriteOp::Update => self.store.update(&doc, quorum).await,
        };
        let response = written.map_err(|e| store_failure("write", e))?;

        if !response.is_ok() {
            debug!(id = %response.id, ?op, "Store reported an error, not caching");
            return Ok(response);
        }

        stamp(&mut doc, &response);
        self.populate(response.id.clone(), doc).await?;
        Ok(response)
    }
}

/// Writes the id and revision assigned by the store into the document.
fn stamp(doc: &mut Document, response: &Response) {
    if let Some(fields) = doc.as_object_mut() {
        fields.insert(ID_FIELD.to_string(), Value::String(response.id.clone()));
        if let Some(rev) = &response.rev {
            fields.insert(REV_FIELD.to_string(), Value::String(rev.clone()));
        }
    }
}

fn encode<T: Serialize>(obj: &T) -> Result<Document> {
    serde_json::to_value(obj).map_err(Error::Codec)
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(doc).map_err(Error::Codec)
}

fn store_failure(target: &str, err: StoreError) -> Error {
    match &err {
        StoreError::NotFound(_) => debug!(%target, "Document not found"),
        _ => warn!(%target, error = %err, "Store operation failed"),
    }
    Error::Store(err)
}
