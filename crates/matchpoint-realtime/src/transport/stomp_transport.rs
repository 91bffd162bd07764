//! STOMP transport adapter
//!
//! Owns one logical realtime connection: authenticated handshake, per-room
//! subscriptions, fire-and-forget publish, and teardown. Retry policy lives
//! in the reconnection controller, not here; operations that need a live
//! session fail fast with `NotConnected`.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use uuid::Uuid;

use matchpoint_common::{decode_user_id, AppError, AppResult, CredentialProvider, RealtimeConfig};
use matchpoint_core::{ChatMessage, WireMessage};

use crate::protocol::{Command, Frame};
use crate::reconnect::Connect;
use crate::transport::{Shared, SubscriptionEntry, Unsubscribe};

/// Transport adapter over a STOMP WebSocket connection
pub struct StompTransport {
    config: RealtimeConfig,
    credentials: Arc<dyn CredentialProvider>,
    shared: Arc<Shared>,
    connect_lock: tokio::sync::Mutex<()>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl StompTransport {
    /// Create a disconnected transport
    #[must_use]
    pub fn new(config: RealtimeConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
            shared: Arc::new(Shared::new()),
            connect_lock: tokio::sync::Mutex::new(()),
            reader_task: Mutex::new(None),
        }
    }

    /// Register the callback for protocol errors and connection loss
    ///
    /// Non-fatal broker errors (bad destination, stale subscription) arrive
    /// here as `TransportProtocol` without tearing the session down; a broken
    /// socket arrives as `TransportConnection` after the state flips.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(AppError) + Send + Sync + 'static,
    {
        self.shared.set_error_handler(Arc::new(callback));
    }

    /// Pure query of the current connection state
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Number of active room subscriptions
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.shared.subscriptions.len()
    }

    /// Open the connection and perform the authenticated handshake
    ///
    /// Idempotent: resolves immediately when already connected. The bearer
    /// token is read from the credential provider at call time.
    pub async fn connect(&self) -> AppResult<()> {
        let _guard = self.connect_lock.lock().await;
        if self.shared.is_connected() {
            tracing::debug!("Realtime transport already connected");
            return Ok(());
        }

        let token = self
            .credentials
            .bearer_token()
            .ok_or(AppError::MissingCredential)?;

        let connect_timeout = self.config.connect_timeout();
        let (socket, _) = tokio::time::timeout(connect_timeout, connect_async(&self.config.url))
            .await
            .map_err(|_| AppError::transport("websocket connect timed out"))?
            .map_err(|e| AppError::transport(format!("websocket connect failed: {e}")))?;

        let (mut sink, mut stream) = socket.split();

        sink.send(WsMessage::Text(Frame::connect(&token).encode()))
            .await
            .map_err(|e| AppError::transport(format!("handshake send failed: {e}")))?;

        tokio::time::timeout(connect_timeout, await_connected(&mut stream))
            .await
            .map_err(|_| AppError::transport("handshake timed out"))??;

        // Writer task drains the frame queue; dropping the sender ends it
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<WsMessage>();
        let writer_shared = self.shared.clone();
        tokio::spawn(async move {
            while let Some(message) = writer_rx.recv().await {
                if sink.send(message).await.is_err() {
                    writer_shared.handle_connection_loss("write failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_shared = self.shared.clone();
        let reader = tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Some(Ok(WsMessage::Text(text))) => {
                        if !Frame::is_heartbeat(&text) {
                            dispatch_frame(&reader_shared, &text);
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        reader_shared.handle_connection_loss("socket closed by peer");
                        break;
                    }
                    Some(Err(e)) => {
                        reader_shared.handle_connection_loss(&format!("read failed: {e}"));
                        break;
                    }
                    Some(Ok(_)) => {} // binary/ping/pong: ignored
                }
            }
        });

        if let Some(stale) = self.reader_task.lock().replace(reader) {
            stale.abort();
        }
        self.shared.mark_connected(writer_tx);

        tracing::info!(url = %self.config.url, "Realtime session established");
        Ok(())
    }

    /// Subscribe to a room's topic
    ///
    /// Fails fast with `NotConnected` while disconnected and with
    /// `AlreadySubscribed` when the room already has an active subscription.
    /// The returned capability cancels the subscription and is safe to invoke
    /// twice.
    pub fn subscribe_to_room<F>(&self, room_id: i64, on_message: F) -> AppResult<Unsubscribe>
    where
        F: Fn(ChatMessage) + Send + Sync + 'static,
    {
        if !self.shared.is_connected() {
            return Err(AppError::NotConnected);
        }

        let sub_id = format!("sub-{}", Uuid::new_v4());
        match self.shared.subscriptions.entry(room_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AppError::AlreadySubscribed(room_id));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(SubscriptionEntry {
                    sub_id: sub_id.clone(),
                    handler: Arc::new(on_message),
                });
            }
        }

        self.shared
            .send_frame(&Frame::subscribe(&sub_id, &self.config.room_topic(room_id)));

        tracing::debug!(room_id, sub_id = %sub_id, "Subscribed to room topic");
        Ok(Unsubscribe::new(room_id, sub_id, self.shared.clone()))
    }

    /// Publish a chat message
    ///
    /// The sender id is recovered from the freshly read bearer token; if it
    /// cannot be, this fails closed instead of publishing a null sender.
    /// Fire-and-forget: no broker acknowledgment is awaited.
    pub fn send_message(&self, room_id: i64, content: &str) -> AppResult<()> {
        if !self.shared.is_connected() {
            return Err(AppError::NotConnected);
        }

        let token = self
            .credentials
            .bearer_token()
            .ok_or(AppError::MissingCredential)?;
        let sender_id = decode_user_id(&token)?;

        let body = serde_json::json!({
            "roomId": room_id,
            "senderId": sender_id,
            "message": content,
        });
        self.shared
            .send_frame(&Frame::send(&self.config.send_destination, body.to_string()));

        tracing::debug!(room_id, sender_id, "Published chat message");
        Ok(())
    }

    /// Tear down the connection and clear all subscription bookkeeping
    ///
    /// Safe to call when already disconnected.
    pub fn disconnect(&self) {
        self.shared.send_frame(&Frame::disconnect());
        if self.shared.mark_disconnected() {
            tracing::info!("Realtime transport disconnected");
        }
        if let Some(task) = self.reader_task.lock().take() {
            task.abort();
        }
    }

    #[cfg(test)]
    pub(crate) fn force_connected_for_test(&self) -> mpsc::UnboundedReceiver<WsMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.mark_connected(tx);
        rx
    }
}

impl Drop for StompTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[async_trait]
impl Connect for StompTransport {
    async fn connect(&self) -> AppResult<()> {
        StompTransport::connect(self).await
    }
}

type WsStream = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

/// Drain the stream until the broker confirms or rejects the session
async fn await_connected(stream: &mut WsStream) -> AppResult<()> {
    while let Some(message) = stream.next().await {
        let message = message.map_err(|e| AppError::transport(format!("handshake read: {e}")))?;
        let WsMessage::Text(text) = message else {
            continue;
        };
        if Frame::is_heartbeat(&text) {
            continue;
        }
        let frame = Frame::parse(&text)
            .map_err(|e| AppError::transport(format!("handshake frame: {e}")))?;
        match frame.command {
            Command::Connected => return Ok(()),
            // An ERROR before establishment is connection-fatal
            Command::Error => {
                let reason = frame
                    .get_header("message")
                    .map_or_else(|| frame.body.clone(), ToString::to_string);
                return Err(AppError::transport(reason));
            }
            _ => {}
        }
    }
    Err(AppError::transport("socket closed during handshake"))
}

/// Route one broker frame to its subscription callback
fn dispatch_frame(shared: &Arc<Shared>, text: &str) {
    let frame = match Frame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unparseable frame");
            shared.emit_error(AppError::TransportProtocol(e.to_string()));
            return;
        }
    };

    match frame.command {
        Command::Message => deliver_message(shared, &frame),
        Command::Error => {
            // Post-establishment broker errors are subscription-scoped, not
            // connection loss
            let reason = frame
                .get_header("message")
                .map_or_else(|| frame.body.clone(), ToString::to_string);
            tracing::warn!(reason = %reason, "Broker reported a protocol error");
            shared.emit_error(AppError::TransportProtocol(reason));
        }
        other => {
            tracing::trace!(command = %other, "Ignoring broker frame");
        }
    }
}

fn deliver_message(shared: &Arc<Shared>, frame: &Frame) {
    let wire: WireMessage = match serde_json::from_str(&frame.body) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed message payload");
            shared.emit_error(AppError::TransportProtocol(format!(
                "malformed message payload: {e}"
            )));
            return;
        }
    };

    let message = match ChatMessage::try_from(wire) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping non-normalizable message");
            shared.emit_error(AppError::TransportProtocol(e.to_string()));
            return;
        }
    };

    let handler = shared
        .subscriptions
        .get(&message.room_id)
        .map(|entry| entry.handler.clone());

    match handler {
        Some(handler) => handler(message),
        None => {
            tracing::debug!(
                room_id = message.room_id,
                "Message for a room with no active subscription"
            );
        }
    }
}
