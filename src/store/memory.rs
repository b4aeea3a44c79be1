//! In-memory document store
//!
//! A single-replica store with revision checking. Write quorums are accepted and
//! ignored.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{doc_id, doc_rev, Document, DocumentStore, Params, Response, ID_FIELD, REV_FIELD};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Create, or update when the current revision is supplied
    Save,
    /// Create only
    Create,
    /// Update only
    Update,
}

// == Memory Store ==
/// Documents held in a map, keyed by id.
#[derive(Debug)]
pub struct MemoryStore {
    db_uri: String,
    docs: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    /// Creates an empty store addressed as `db_uri` (e.g. `memory://users`).
    pub fn new(db_uri: impl Into<String>) -> Self {
        let db_uri = db_uri.into().trim_end_matches('/').to_string();
        Self {
            db_uri,
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

/// Next revision: generation counter plus a random suffix.
fn next_rev(current: Option<&str>) -> String {
    let generation = current
        .and_then(|rev| rev.split('-').next())
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{}-{}", generation + 1, Uuid::new_v4().simple())
}

fn write(
    docs: &mut HashMap<String, Document>,
    doc: &Document,
    mode: WriteMode,
) -> StoreResult<Response> {
    if !doc.is_object() {
        return Err(StoreError::InvalidDocument(
            "document must be a JSON object".to_string(),
        ));
    }

    let id = match (doc_id(doc), mode) {
        (Some(id), _) => id.to_string(),
        (None, WriteMode::Update) => {
            return Err(StoreError::InvalidDocument(
                "update requires an _id".to_string(),
            ))
        }
        (None, _) => Uuid::new_v4().simple().to_string(),
    };
    let supplied_rev = doc_rev(doc);
    let current_rev = docs.get(&id).and_then(doc_rev).map(str::to_string);

    match (mode, docs.contains_key(&id)) {
        (WriteMode::Create, true) => return Err(StoreError::Conflict(id)),
        (WriteMode::Update, false) => return Err(StoreError::NotFound(id)),
        (_, true) if supplied_rev != current_rev.as_deref() => {
            return Err(StoreError::Conflict(id))
        }
        (_, false) if supplied_rev.is_some() => return Err(StoreError::Conflict(id)),
        _ => {}
    }

    let rev = next_rev(current_rev.as_deref());
    let mut stored = doc.clone();
    if let Some(fields) = stored.as_object_mut() {
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        fields.insert(REV_FIELD.to_string(), Value::String(rev.clone()));
    }
    docs.insert(id.clone(), stored);

    debug!(%id, %rev, ?mode, "Stored document");
    Ok(Response::success(id, rev))
}

fn bulk_failure(doc: &Document, err: StoreError) -> Response {
    let id = doc_id(doc).unwrap_or_default();
    let kind = match &err {
        StoreError::Conflict(_) => "conflict",
        StoreError::NotFound(_) => "not_found",
        StoreError::InvalidDocument(_) => "bad_request",
        StoreError::Transport(_) => "unavailable",
    };
    Response::failure(id, kind, err.to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn db_uri(&self) -> &str {
        &self.db_uri
    }

    async fn find(&self, id: &str) -> StoreResult<Document> {
        self.docs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn find_with_params(&self, id: &str, params: &Params) -> StoreResult<Document> {
        let doc = self.find(id).await?;
        match params.rev.as_deref() {
            // Only the current revision is retained
            Some(rev) if doc_rev(&doc) != Some(rev) => {
                Err(StoreError::NotFound(format!("{}@{}", id, rev)))
            }
            _ => Ok(doc),
        }
    }

    async fn find_any(&self, uri: &str) -> StoreResult<Document> {
        let id = uri
            .strip_prefix(self.db_uri.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| rest.split('?').next().unwrap_or(rest))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))?;
        self.find(id)
            .await
            .map_err(|_| StoreError::NotFound(uri.to_string()))
    }

    async fn contains(&self, id: &str) -> StoreResult<bool> {
        Ok(self.docs.read().await.contains_key(id))
    }

    async fn save(&self, doc: &Document, _write_quorum: Option<u32>) -> StoreResult<Response> {
        write(&mut *self.docs.write().await, doc, WriteMode::Save)
    }

    async fn post(&self, doc: &Document, _write_quorum: Option<u32>) -> StoreResult<Response> {
        write(&mut *self.docs.write().await, doc, WriteMode::Create)
    }

    async fn update(&self, doc: &Document, _write_quorum: Option<u32>) -> StoreResult<Response> {
        write(&mut *self.docs.write().await, doc, WriteMode::Update)
    }

    async fn remove(&self, doc: &Document) -> StoreResult<Response> {
        match (doc_id(doc), doc_rev(doc)) {
            (Some(id), Some(rev)) => self.remove_by_id(id, rev).await,
            _ => Err(StoreError::InvalidDocument(
                "remove requires _id and _rev".to_string(),
            )),
        }
    }

    async fn remove_by_id(&self, id: &str, rev: &str) -> StoreResult<Response> {
        let mut docs = self.docs.write().await;
        let current = docs
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if doc_rev(current) != Some(rev) {
            return Err(StoreError::Conflict(id.to_string()));
        }

        docs.remove(id);
        debug!(%id, "Removed document");
        Ok(Response::success(id, next_rev(Some(rev))))
    }

    async fn bulk(&self, docs: &[Document]) -> StoreResult<Vec<Response>> {
        let mut stored = self.docs.write().await;
        let responses = docs
            .iter()
            .map(|doc| {
                write(&mut stored, doc, WriteMode::Save).unwrap_or_else(|e| bulk_failure(doc, e))
            })
            .collect();
        Ok(responses)
    }
}
