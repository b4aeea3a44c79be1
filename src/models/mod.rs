//! Request and Response models for the cache node API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies, on both the
//! server and the remote cache client.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{key_to_segment, segment_to_key, validate_key, PutEntryRequest};
pub use responses::{
    ClearResponse, DeleteResponse, ErrorResponse, GetEntryResponse, HealthResponse,
    PutEntryResponse, SizeResponse, StatsResponse,
};
