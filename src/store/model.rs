//! Store request and response types

use serde::{Deserialize, Serialize};

/// Outcome of a single write, as reported by the store.
///
/// Single-document writes fail with a [`crate::StoreError`] instead. Bulk writes
/// report each item through this type, and `error` is set for the items that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Id of the written document
    pub id: String,
    /// Revision produced by the write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Error kind for a failed bulk item (e.g. "conflict")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Response {
    pub fn success(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: Some(rev.into()),
            error: None,
            reason: None,
        }
    }

    pub fn failure(
        id: impl Into<String>,
        error: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rev: None,
            error: Some(error.into()),
            reason: Some(reason.into()),
        }
    }

    /// True when the store reported no error for this write.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Read options passed through to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Fetch this exact revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Number of replicas that must answer the read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_quorum: Option<u32>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    pub fn read_quorum(mut self, quorum: u32) -> Self {
        self.read_quorum = Some(quorum);
        self
    }
}
