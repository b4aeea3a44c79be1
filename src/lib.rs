//! doc_cache - cache-aside layer for a JSON document store
//!
//! [`StoreCache`] wraps a [`DocumentStore`] and any [`Cache`] backend: reads are served
//! from the cache when possible and populated from the store on a miss, writes go to
//! the store first and are mirrored into the cache only once the store confirms them.
//!
//! Backends: [`LruCache`] (bounded, no lifetimes), [`InProcessCache`] (bounded, with
//! lifetimes and statistics) and [`RemoteCache`] (a cache node reached over HTTP, see
//! [`api`]).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod store_cache;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    Cache, CacheEntry, CacheStatistics, CacheStats, InProcessCache, LifetimeCache, LruCache,
    RemoteCache,
};
pub use config::Config;
pub use error::{CacheError, Error, Result, StoreError};
pub use store::{Document, DocumentStore, MemoryStore, Params, Response};
pub use store_cache::StoreCache;
pub use tasks::spawn_cleanup_task;
