//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, MAX_KEY_LENGTH};

/// Request body for storing an entry (PUT /entries/:key)
///
/// The entry arrives already stamped with its absolute expiration time, so the node
/// never applies a lifetime of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutEntryRequest {
    /// Encoded value and its expiration time
    pub entry: CacheEntry<serde_json::Value>,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!("Key exceeds maximum length of {} bytes", MAX_KEY_LENGTH));
    }
    None
}

/// True for `.`/`..` with any number of leading `~`.
fn is_dot_segment_like(segment: &str) -> bool {
    matches!(segment.trim_start_matches('~'), "." | "..")
}

/// Renders a key as the `:key` path segment of `/entries/:key`.
///
/// URL normalization drops `.` and `..` segments, which would route `..` to the
/// clear-all endpoint. Such keys get one extra leading `~`; every other key is
/// sent as-is.
pub fn key_to_segment(key: &str) -> Cow<'_, str> {
    if is_dot_segment_like(key) {
        Cow::Owned(format!("~{}", key))
    } else {
        Cow::Borrowed(key)
    }
}

/// Inverse of [`key_to_segment`], applied by the node to the decoded path segment.
pub fn segment_to_key(segment: String) -> String {
    if segment.starts_with('~') && is_dot_segment_like(&segment) {
        segment[1..].to_string()
    } else {
        segment
    }
}
