//! Wire DTOs for the REST backend
//!
//! The backend wraps every payload in a `{ "data": ... }` envelope; paginated
//! routes add a `pagination` block. Item payloads deserialize into the wire
//! shapes from `matchpoint-core` and are normalized at the client boundary.

use serde::{Deserialize, Serialize};

/// Generic `{ "data": T }` envelope
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Paginated `{ "data": [...], "pagination": {...} }` envelope
#[derive(Debug, Deserialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata block
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Cursor for the next page, absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether more results exist
    pub has_next: bool,
}

/// Body for `POST /v1/chat/rooms`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub match_id: i64,
    pub guest_id: i64,
}
