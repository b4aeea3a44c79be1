//! API Module
//!
//! HTTP handlers and routing for the cache node that backs [`crate::cache::RemoteCache`].
//!
//! # Endpoints
//! - `GET /entries/:key` - Fetch a stored entry
//! - `PUT /entries/:key` - Store a client-stamped entry
//! - `DELETE /entries/:key` - Delete an entry
//! - `DELETE /entries` - Clear the cache
//! - `GET /size` - Number of stored entries
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
