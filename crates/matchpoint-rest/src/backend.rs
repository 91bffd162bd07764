//! Backend seam trait
//!
//! The session layer talks to the REST backend through this trait so its
//! merge/pagination logic is testable against in-memory fakes.

use async_trait::async_trait;
use matchpoint_common::AppResult;
use matchpoint_core::{ChatMessage, ChatRoom, CursorPage};

/// REST operations the chat session depends on
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Fetch one page of the current user's rooms, backend-ordered by recency
    async fn list_my_rooms(
        &self,
        cursor: Option<&str>,
        size: u32,
    ) -> AppResult<CursorPage<ChatRoom>>;

    /// Fetch one page of message history, newest-first as the backend returns it
    async fn message_history(
        &self,
        room_id: i64,
        cursor: Option<&str>,
        size: u32,
    ) -> AppResult<CursorPage<ChatMessage>>;

    /// Create a 1:1 room for a match
    async fn create_room(&self, match_id: i64, guest_id: i64) -> AppResult<ChatRoom>;

    /// Mark every message in a room as read
    async fn mark_room_read(&self, room_id: i64) -> AppResult<()>;
}
