//! Per-room message timeline
//!
//! Reconciles REST history pages with realtime pushes: initial load replaces
//! the timeline sorted ascending, "load older" prepends after dedup, live
//! ingestion is a strict O(1) append. History pages and the live stream carry
//! no global ordering guarantee relative to each other; this policy is the
//! sole ordering mechanism.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;

use matchpoint_common::AppResult;
use matchpoint_core::{sender_display_flags, ChatMessage};
use matchpoint_rest::HistoryBackend;

use crate::scroll::ScrollNotifier;

/// Ordered, deduplicated message timeline for one open room
pub struct RoomTimeline {
    backend: Arc<dyn HistoryBackend>,
    room_id: i64,
    page_size: u32,
    messages: Vec<ChatMessage>,
    next_cursor: Option<String>,
    has_next: bool,
    loading: bool,
    last_error: Option<&'static str>,
    scroll: ScrollNotifier,
    scroll_rx: Option<mpsc::UnboundedReceiver<()>>,
}

impl RoomTimeline {
    /// Create an empty timeline for a room
    #[must_use]
    pub fn new(backend: Arc<dyn HistoryBackend>, room_id: i64, page_size: u32) -> Self {
        let (scroll, scroll_rx) = ScrollNotifier::new(ScrollNotifier::DEFAULT_DEBOUNCE);
        Self {
            backend,
            room_id,
            page_size,
            messages: Vec::new(),
            next_cursor: None,
            has_next: false,
            loading: false,
            last_error: None,
            scroll,
            scroll_rx: Some(scroll_rx),
        }
    }

    /// Take the scroll-to-bottom signal receiver (once)
    pub fn scroll_signals(&mut self) -> Option<mpsc::UnboundedReceiver<()>> {
        self.scroll_rx.take()
    }

    /// Fetch the latest page and replace the timeline
    ///
    /// Issues the room's read receipt as a side effect; a receipt failure
    /// surfaces on the error flag but never disturbs the loaded timeline.
    pub async fn load_initial(&mut self) -> AppResult<()> {
        if self.loading {
            return Ok(());
        }
        self.loading = true;
        let result = self
            .backend
            .message_history(self.room_id, None, self.page_size)
            .await;
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                self.last_error = Some(err.error_code());
                return Err(err);
            }
        };

        let mut messages = page.items;
        sort_ascending(&mut messages);
        self.messages = messages;
        self.next_cursor = page.next_cursor;
        self.has_next = page.has_next;
        self.last_error = None;

        tracing::debug!(
            room_id = self.room_id,
            messages = self.messages.len(),
            "Initial history loaded"
        );

        if let Err(err) = self.backend.mark_room_read(self.room_id).await {
            tracing::warn!(room_id = self.room_id, error = %err, "Read receipt failed");
            self.last_error = Some(err.error_code());
        }
        Ok(())
    }

    /// Fetch the next-older page and prepend it
    ///
    /// No-op while a fetch is in flight or when the backend reported no
    /// further pages.
    pub async fn load_older(&mut self) -> AppResult<()> {
        if self.loading || !self.has_next {
            return Ok(());
        }
        self.loading = true;
        let result = self
            .backend
            .message_history(self.room_id, self.next_cursor.as_deref(), self.page_size)
            .await;
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                self.last_error = Some(err.error_code());
                return Err(err);
            }
        };

        let mut older = page.items;
        sort_ascending(&mut older);

        // Page overlap must not produce duplicate ids in the timeline
        let known: HashSet<i64> = self.messages.iter().map(|m| m.id).collect();
        older.retain(|m| !known.contains(&m.id));

        older.append(&mut self.messages);
        self.messages = older;
        self.next_cursor = page.next_cursor;
        self.has_next = page.has_next;
        self.last_error = None;

        tracing::debug!(
            room_id = self.room_id,
            messages = self.messages.len(),
            has_next = self.has_next,
            "Older history prepended"
        );
        Ok(())
    }

    /// Append one live message to the tail
    ///
    /// Live delivery is assumed chronologically at-or-after loaded history;
    /// an out-of-order arrival is logged and appended anyway rather than
    /// silently re-sorting the timeline.
    pub fn ingest_realtime(&mut self, message: ChatMessage) {
        if let Some(tail) = self.messages.last() {
            if message.created_at < tail.created_at {
                tracing::warn!(
                    room_id = self.room_id,
                    incoming = %message.created_at,
                    tail = %tail.created_at,
                    "Live message older than timeline tail; appending anyway"
                );
            }
        }
        self.messages.push(message);
        self.scroll.request();
    }

    /// The ordered timeline
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether an older page can still be fetched
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Whether a fetch is currently in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether no messages are loaded (full-room error state vs inline)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Error code of the last failed operation, if any
    #[must_use]
    pub fn last_error(&self) -> Option<&'static str> {
        self.last_error
    }

    /// Sender-display hints for the current timeline
    #[must_use]
    pub fn display_flags(&self) -> Vec<bool> {
        sender_display_flags(&self.messages)
    }
}

fn sort_ascending(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
