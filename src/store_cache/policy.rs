//! Cache population policies
//!
//! A [`Population`] decides how [`super::StoreCache`] writes documents into its
//! cache: with the backend's own `put`, or with an explicit lifetime.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{Cache, LifetimeCache};
use crate::error::CacheResult;
use crate::store::Document;

/// How documents are inserted into a cache of type `C`.
#[async_trait]
pub trait Population<C: ?Sized>: Send + Sync {
    async fn populate(&self, cache: &C, key: String, doc: Document) -> CacheResult<()>;

    async fn populate_all(&self, cache: &C, docs: HashMap<String, Document>) -> CacheResult<()>;
}

/// Populate with [`Cache::put`]. Whatever retention the backend applies by default
/// is what the documents get.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

#[async_trait]
impl<C> Population<C> for Plain
where
    C: Cache<String, Document> + ?Sized,
{
    async fn populate(&self, cache: &C, key: String, doc: Document) -> CacheResult<()> {
        cache.put(key, doc).await
    }

    async fn populate_all(&self, cache: &C, docs: HashMap<String, Document>) -> CacheResult<()> {
        cache.put_all(docs).await
    }
}

/// Populate with [`LifetimeCache::put_with_lifetime`] using a fixed lifetime.
///
/// The expiration time is computed by the backend at each population, so a
/// document fetched late in the wrapper's life still gets the full lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithLifetime {
    lifetime: Duration,
}

impl WithLifetime {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

#[async_trait]
impl<C> Population<C> for WithLifetime
where
    C: LifetimeCache<String, Document> + ?Sized,
{
    async fn populate(&self, cache: &C, key: String, doc: Document) -> CacheResult<()> {
        cache.put_with_lifetime(key, doc, self.lifetime).await
    }

    async fn populate_all(&self, cache: &C, docs: HashMap<String, Document>) -> CacheResult<()> {
        cache.put_all_with_lifetime(docs, self.lifetime).await
    }
}
