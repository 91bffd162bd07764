//! Subscription bookkeeping shared between the transport and its tasks
//!
//! The room-id-keyed table guarantees at most one active subscription per
//! room from this adapter's perspective.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use matchpoint_common::AppError;
use matchpoint_core::ChatMessage;

use crate::protocol::Frame;

/// Per-room message callback
pub(crate) type MessageHandler = Arc<dyn Fn(ChatMessage) + Send + Sync>;

/// Error callback for protocol and connection-loss events
pub(crate) type ErrorHandler = Arc<dyn Fn(AppError) + Send + Sync>;

/// One active room subscription
pub(crate) struct SubscriptionEntry {
    pub sub_id: String,
    pub handler: MessageHandler,
}

/// State shared between the transport handle and its reader/writer tasks
pub(crate) struct Shared {
    connected: AtomicBool,
    pub subscriptions: DashMap<i64, SubscriptionEntry>,
    writer: Mutex<Option<mpsc::UnboundedSender<WsMessage>>>,
    on_error: RwLock<Option<ErrorHandler>>,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            subscriptions: DashMap::new(),
            writer: Mutex::new(None),
            on_error: RwLock::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Install the writer channel and flip to connected
    pub fn mark_connected(&self, writer: mpsc::UnboundedSender<WsMessage>) {
        *self.writer.lock() = Some(writer);
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Tear down bookkeeping after the socket is gone
    ///
    /// Returns false when already disconnected, so loss events fire once.
    pub fn mark_disconnected(&self) -> bool {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return false;
        }
        *self.writer.lock() = None;
        self.subscriptions.clear();
        true
    }

    /// Queue a frame on the writer task, dropped silently when disconnected
    pub fn send_frame(&self, frame: &Frame) {
        if let Some(writer) = self.writer.lock().as_ref() {
            let _ = writer.send(WsMessage::Text(frame.encode()));
        }
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        *self.on_error.write() = Some(handler);
    }

    pub fn emit_error(&self, err: AppError) {
        if let Some(handler) = self.on_error.read().as_ref() {
            handler(err);
        }
    }

    /// Socket-level failure after establishment
    pub fn handle_connection_loss(&self, reason: &str) {
        if self.mark_disconnected() {
            tracing::warn!(reason, "Realtime connection lost");
            self.emit_error(AppError::transport(reason));
        }
    }
}

/// Capability to cancel a room subscription
///
/// Idempotent: the first call sends UNSUBSCRIBE and removes exactly one table
/// entry; later calls are no-ops.
pub struct Unsubscribe {
    room_id: i64,
    sub_id: String,
    shared: Arc<Shared>,
    done: AtomicBool,
}

impl Unsubscribe {
    pub(crate) fn new(room_id: i64, sub_id: String, shared: Arc<Shared>) -> Self {
        Self {
            room_id,
            sub_id,
            shared,
            done: AtomicBool::new(false),
        }
    }

    /// Cancel the subscription
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }
        // Only remove the entry this capability created; a later subscriber
        // for the same room keeps its own entry
        let removed = self
            .shared
            .subscriptions
            .remove_if(&self.room_id, |_, entry| entry.sub_id == self.sub_id)
            .is_some();
        if removed {
            self.shared.send_frame(&Frame::unsubscribe(&self.sub_id));
            tracing::debug!(room_id = self.room_id, "Unsubscribed from room");
        }
    }

    /// Check if this capability was already invoked
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}
