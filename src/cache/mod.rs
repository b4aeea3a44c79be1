//! Cache Module
//!
//! Cache capability traits and the backends that implement them:
//! - [`LruCache`]: bounded in-memory map, no lifetimes, no statistics
//! - [`InProcessCache`]: bounded in-memory map with per-entry lifetimes
//! - [`RemoteCache`]: lifetime-aware client for a cache node

pub mod entry;
mod in_process;
mod lru;
mod lru_cache;
mod remote;
mod stats;
mod traits;


// Re-export public types
pub use entry::CacheEntry;
pub use in_process::InProcessCache;
pub use lru::LruMap;
pub use lru_cache::LruCache;
pub use remote::RemoteCache;
pub use stats::{CacheStatistics, CacheStats};
pub use traits::{Cache, LifetimeCache};

// == Public Constants ==
/// Maximum key length accepted by the cache node, in bytes.
///
/// Keys are document ids or full document URIs.
pub const MAX_KEY_LENGTH: usize = 1024;
