//! Session root
//!
//! One `ChatSession` per tab, explicitly constructed and passed by handle to
//! room views: it owns the single transport, the REST backend, and the
//! reconnection controller, so "one connection per tab" holds without hidden
//! global state.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use matchpoint_common::{AppConfig, AppError, AppResult, CredentialProvider, ReconnectConfig};
use matchpoint_core::{ChatMessage, ChatRoom};
use matchpoint_realtime::{ReconnectController, SessionState, StompTransport, Unsubscribe};
use matchpoint_rest::{ChatApi, HistoryBackend};

use crate::rooms::RoomListController;
use crate::timeline::RoomTimeline;

/// The per-tab chat session
pub struct ChatSession {
    transport: Arc<StompTransport>,
    backend: Arc<dyn HistoryBackend>,
    reconnect: ReconnectController,
    page_size: u32,
}

impl ChatSession {
    /// Build a session from configuration
    pub fn new(config: &AppConfig, credentials: Arc<dyn CredentialProvider>) -> AppResult<Self> {
        let backend = Arc::new(ChatApi::new(&config.rest, credentials.clone())?);
        let transport = Arc::new(StompTransport::new(config.realtime.clone(), credentials));
        Ok(Self::with_parts(
            transport,
            backend,
            config.reconnect.clone(),
            config.rest.page_size,
        ))
    }

    /// Build a session from injected parts (tests, alternative backends)
    #[must_use]
    pub fn with_parts(
        transport: Arc<StompTransport>,
        backend: Arc<dyn HistoryBackend>,
        reconnect: ReconnectConfig,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            backend,
            reconnect: ReconnectController::new(reconnect),
            page_size,
        }
    }

    /// Start connecting with the bounded-backoff policy
    pub fn connect_with_retry(&self) {
        self.reconnect.spawn(self.transport.clone());
    }

    /// Current realtime session state
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.reconnect.state()
    }

    /// Subscribe to session-state transitions
    #[must_use]
    pub fn watch_session_state(&self) -> watch::Receiver<SessionState> {
        self.reconnect.watch()
    }

    /// The shared transport (error-callback registration, direct queries)
    #[must_use]
    pub fn transport(&self) -> &Arc<StompTransport> {
        &self.transport
    }

    /// A fresh room-list controller bound to this session's backend
    #[must_use]
    pub fn room_list(&self) -> RoomListController {
        RoomListController::new(self.backend.clone(), self.page_size)
    }

    /// Create a 1:1 room for a match
    pub async fn create_room(&self, match_id: i64, guest_id: i64) -> AppResult<ChatRoom> {
        self.backend.create_room(match_id, guest_id).await
    }

    /// Open a room: load the latest history page, then subscribe its topic
    ///
    /// When the realtime channel is down (degraded mode) the room still opens
    /// REST-only; live delivery resumes on the next mount after a reconnect.
    pub async fn open_room(&self, room_id: i64) -> AppResult<RoomHandle> {
        let mut timeline = RoomTimeline::new(self.backend.clone(), room_id, self.page_size);
        timeline.load_initial().await?;

        let (live_tx, live_rx) = mpsc::unbounded_channel();
        let unsubscribe = match self.transport.subscribe_to_room(room_id, move |message| {
            // Receiver dropped after close: late deliveries are discarded
            let _ = live_tx.send(message);
        }) {
            Ok(unsubscribe) => Some(unsubscribe),
            Err(AppError::NotConnected) => {
                tracing::debug!(room_id, "Realtime unavailable; room opened REST-only");
                None
            }
            Err(err) => return Err(err),
        };

        Ok(RoomHandle {
            room_id,
            timeline,
            incoming: live_rx,
            unsubscribe,
        })
    }

    /// Publish a message to a room
    pub fn send(&self, room_id: i64, content: &str) -> AppResult<()> {
        self.transport.send_message(room_id, content)
    }

    /// Tear down the controller and the transport
    pub fn shutdown(&self) {
        self.reconnect.shutdown();
        self.transport.disconnect();
    }
}

/// One open room view: timeline plus its live feed and unsubscribe capability
pub struct RoomHandle {
    room_id: i64,
    timeline: RoomTimeline,
    incoming: mpsc::UnboundedReceiver<ChatMessage>,
    unsubscribe: Option<Unsubscribe>,
}

impl RoomHandle {
    #[must_use]
    pub fn room_id(&self) -> i64 {
        self.room_id
    }

    #[must_use]
    pub fn timeline(&self) -> &RoomTimeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut RoomTimeline {
        &mut self.timeline
    }

    /// Whether live delivery is wired up (false in degraded mode)
    #[must_use]
    pub fn has_live_feed(&self) -> bool {
        self.unsubscribe.is_some()
    }

    /// Ingest every already-delivered live message; returns how many
    pub fn pump(&mut self) -> usize {
        let mut ingested = 0;
        while let Ok(message) = self.incoming.try_recv() {
            self.timeline.ingest_realtime(message);
            ingested += 1;
        }
        ingested
    }

    /// Await the next live message and ingest it
    ///
    /// Returns false once the feed is closed.
    pub async fn wait_live(&mut self) -> bool {
        match self.incoming.recv().await {
            Some(message) => {
                self.timeline.ingest_realtime(message);
                true
            }
            None => false,
        }
    }

    /// Fetch and prepend the next-older history page
    pub async fn load_older(&mut self) -> AppResult<()> {
        self.timeline.load_older().await
    }

    /// Unsubscribe and stop accepting live deliveries; idempotent
    pub fn close(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe.unsubscribe();
        }
        self.incoming.close();
    }
}

impl Drop for RoomHandle {
    fn drop(&mut self) {
        self.close();
    }
}
