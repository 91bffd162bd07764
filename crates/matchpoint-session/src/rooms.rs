//! Room list controller
//!
//! Shares the cursor-pagination contract with message history but without the
//! sort-and-merge step: rooms arrive backend-ordered by recency and are
//! appended verbatim on load-more.

use std::sync::Arc;

use matchpoint_common::AppResult;
use matchpoint_core::ChatRoom;
use matchpoint_rest::HistoryBackend;

/// Paginated list of the current user's rooms
pub struct RoomListController {
    backend: Arc<dyn HistoryBackend>,
    page_size: u32,
    rooms: Vec<ChatRoom>,
    next_cursor: Option<String>,
    has_next: bool,
    loading: bool,
    last_error: Option<&'static str>,
}

impl RoomListController {
    /// Create an empty controller
    #[must_use]
    pub fn new(backend: Arc<dyn HistoryBackend>, page_size: u32) -> Self {
        Self {
            backend,
            page_size,
            rooms: Vec::new(),
            next_cursor: None,
            has_next: false,
            loading: false,
            last_error: None,
        }
    }

    /// Fetch the first page, replacing the list
    pub async fn load_initial(&mut self) -> AppResult<()> {
        if self.loading {
            return Ok(());
        }
        self.loading = true;
        let result = self.backend.list_my_rooms(None, self.page_size).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.rooms = page.items;
                self.next_cursor = page.next_cursor;
                self.has_next = page.has_next;
                self.last_error = None;
                tracing::debug!(rooms = self.rooms.len(), "Room list loaded");
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.error_code());
                Err(err)
            }
        }
    }

    /// Append the next page; no-op while loading or exhausted
    pub async fn load_more(&mut self) -> AppResult<()> {
        if self.loading || !self.has_next {
            return Ok(());
        }
        self.loading = true;
        let result = self
            .backend
            .list_my_rooms(self.next_cursor.as_deref(), self.page_size)
            .await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.rooms.extend(page.items);
                self.next_cursor = page.next_cursor;
                self.has_next = page.has_next;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.error_code());
                Err(err)
            }
        }
    }

    /// Mark a room read on the backend, then zero its local unread count
    pub async fn mark_read(&mut self, room_id: i64) -> AppResult<()> {
        self.backend.mark_room_read(room_id).await?;
        if let Some(room) = self.rooms.iter_mut().find(|r| r.id == room_id) {
            room.mark_read_local();
        }
        Ok(())
    }

    #[must_use]
    pub fn rooms(&self) -> &[ChatRoom] {
        &self.rooms
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&'static str> {
        self.last_error
    }
}
