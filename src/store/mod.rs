//! Store Module
//!
//! The authoritative document store that [`crate::StoreCache`] sits in front of.

mod memory;
mod model;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use memory::MemoryStore;
pub use model::{Params, Response};

/// A decoded JSON document. Stored documents are objects carrying `_id` and `_rev`.
pub type Document = serde_json::Value;

/// Field holding a document's id.
pub const ID_FIELD: &str = "_id";

/// Field holding a document's revision.
pub const REV_FIELD: &str = "_rev";

/// The document's `_id`, if it has one.
pub fn doc_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(|v| v.as_str())
}

/// The document's `_rev`, if it has one.
pub fn doc_rev(doc: &Document) -> Option<&str> {
    doc.get(REV_FIELD).and_then(|v| v.as_str())
}

/// Authoritative document store.
///
/// Single-document writes either succeed with a [`Response`] or fail with a
/// [`crate::StoreError`]. `bulk` never fails per item: it returns one response per
/// input document, in input order, with `error` set on the items that failed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Base URI of the database. `find_any` accepts `<db_uri>/<id>`.
    fn db_uri(&self) -> &str;

    async fn find(&self, id: &str) -> StoreResult<Document>;

    async fn find_with_params(&self, id: &str, params: &Params) -> StoreResult<Document>;

    /// Fetches a document by its full URI.
    async fn find_any(&self, uri: &str) -> StoreResult<Document>;

    async fn contains(&self, id: &str) -> StoreResult<bool>;

    /// Creates or updates a document. `write_quorum` is passed to the store untouched.
    async fn save(&self, doc: &Document, write_quorum: Option<u32>) -> StoreResult<Response>;

    /// Creates a new document, failing if the id is taken.
    async fn post(&self, doc: &Document, write_quorum: Option<u32>) -> StoreResult<Response>;

    /// Updates an existing document. Requires `_id` and the current `_rev`.
    async fn update(&self, doc: &Document, write_quorum: Option<u32>) -> StoreResult<Response>;

    /// Deletes the document identified by the `_id`/`_rev` it carries.
    async fn remove(&self, doc: &Document) -> StoreResult<Response>;

    async fn remove_by_id(&self, id: &str, rev: &str) -> StoreResult<Response>;

    /// Writes a batch of documents in one call.
    async fn bulk(&self, docs: &[Document]) -> StoreResult<Vec<Response>>;
}
