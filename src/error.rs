//! Error types for the document cache
//!
//! Cache backends, the authoritative store and the cache-aside coordinator each
//! report through their own thiserror enum.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failures raised by a cache backend or the cache node.
///
/// A cache miss is never an error: backends return `Ok(None)` for that.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not be reached or answered with a failure status
    #[error("Cache transport failure: {0}")]
    Transport(String),

    /// An entry could not be encoded or decoded
    #[error("Cache serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key is not acceptable to the backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key not present on the cache node
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Internal backend error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Transport(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_) | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::Transport(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

// == Store Error Enum ==
/// Failures reported by the authoritative document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document exists for the requested id or URI
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The write carried a stale or missing revision
    #[error("Document update conflict: {0}")]
    Conflict(String),

    /// The document is not a JSON object or lacks a required field
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The store could not be reached
    #[error("Store transport failure: {0}")]
    Transport(String),
}

// == Coordinator Error Enum ==
/// Error surfaced by [`crate::store_cache::StoreCache`].
#[derive(Error, Debug)]
pub enum Error {
    /// The store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The cache backend failed (distinct from a miss)
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A document could not be converted to or from the caller's type
    #[error("Document codec failure: {0}")]
    Codec(#[source] serde_json::Error),
}

impl Error {
    /// Returns true when the store reported the document as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(StoreError::NotFound(_)))
    }

    /// Returns true when the store rejected a write as a revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Store(StoreError::Conflict(_)))
    }
}

// == Result Type Aliases ==
/// Result type for cache backend operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for coordinated cache-aside operations.
pub type Result<T> = std::result::Result<T, Error>;
