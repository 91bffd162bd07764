//! In-process mock STOMP broker
//!
//! Accepts a WebSocket client, answers the CONNECT handshake, records the
//! client frames it observes, and lets tests push MESSAGE and ERROR frames
//! downstream.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use matchpoint_realtime::{Command, Frame};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client activity observed by the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    Connected { authorization: Option<String> },
    Subscribed { id: String, destination: String },
    Unsubscribed { id: String },
    Sent { destination: String, body: String },
    Disconnected,
}

/// One-client mock broker bound to an ephemeral loopback port
pub struct MockBroker {
    url: String,
    push_tx: mpsc::UnboundedSender<String>,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<BrokerEvent>>,
    _handle: JoinHandle<()>,
}

impl MockBroker {
    /// Bind and start accepting connections
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);

        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(serve(listener, push_rx, event_tx));

        Ok(Self {
            url,
            push_tx,
            events: tokio::sync::Mutex::new(event_rx),
            _handle: handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver a chat message to the connected client
    pub fn push_message(&self, room_id: i64, body: &Value) {
        let frame = Frame::new(Command::Message)
            .header("subscription", "sub-0")
            .header("destination", format!("/topic/chat/room/{room_id}"))
            .header("content-type", "application/json")
            .with_body(body.to_string());
        let _ = self.push_tx.send(frame.encode());
    }

    /// Deliver a broker-side protocol error to the connected client
    pub fn push_error(&self, reason: &str) {
        let frame = Frame::new(Command::Error).header("message", reason);
        let _ = self.push_tx.send(frame.encode());
    }

    /// Await the next recorded client event
    pub async fn next_event(&self) -> Result<BrokerEvent> {
        let mut events = self.events.lock().await;
        let event = tokio::time::timeout(EVENT_TIMEOUT, events.recv())
            .await
            .context("timed out waiting for a broker event")?;
        event.context("broker task ended")
    }

    /// Await the next SUBSCRIBE, skipping unrelated events
    pub async fn await_subscribed(&self) -> Result<(String, String)> {
        loop {
            match self.next_event().await? {
                BrokerEvent::Subscribed { id, destination } => return Ok((id, destination)),
                BrokerEvent::Disconnected => bail!("client disconnected before subscribing"),
                _ => {}
            }
        }
    }

    /// Await the next SEND, skipping unrelated events
    pub async fn await_sent(&self) -> Result<(String, String)> {
        loop {
            match self.next_event().await? {
                BrokerEvent::Sent { destination, body } => return Ok((destination, body)),
                BrokerEvent::Disconnected => bail!("client disconnected before sending"),
                _ => {}
            }
        }
    }
}

async fn serve(
    listener: TcpListener,
    mut push_rx: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::UnboundedSender<BrokerEvent>,
) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = accept_async(stream).await else {
            continue;
        };

        loop {
            tokio::select! {
                inbound = socket.next() => match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        if Frame::is_heartbeat(&text) {
                            continue;
                        }
                        let Ok(frame) = Frame::parse(&text) else {
                            continue;
                        };
                        if handle_client_frame(&mut socket, &frame, &event_tx)
                            .await
                            .is_err()
                        {
                            break;
                        }
                        if frame.command == Command::Disconnect {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        let _ = event_tx.send(BrokerEvent::Disconnected);
                        break;
                    }
                    Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                },
                outbound = push_rx.recv() => match outbound {
                    Some(raw) => {
                        if socket.send(WsMessage::Text(raw)).await.is_err() {
                            break;
                        }
                    }
                    None => return,
                },
            }
        }
    }
}

async fn handle_client_frame<S>(
    socket: &mut tokio_tungstenite::WebSocketStream<S>,
    frame: &Frame,
    event_tx: &mpsc::UnboundedSender<BrokerEvent>,
) -> Result<()>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    match frame.command {
        Command::Connect => {
            let _ = event_tx.send(BrokerEvent::Connected {
                authorization: frame.get_header("Authorization").map(ToString::to_string),
            });
            let reply = Frame::new(Command::Connected).header("version", "1.2");
            socket.send(WsMessage::Text(reply.encode())).await?;
        }
        Command::Subscribe => {
            let _ = event_tx.send(BrokerEvent::Subscribed {
                id: frame.get_header("id").unwrap_or_default().to_string(),
                destination: frame
                    .get_header("destination")
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Command::Unsubscribe => {
            let _ = event_tx.send(BrokerEvent::Unsubscribed {
                id: frame.get_header("id").unwrap_or_default().to_string(),
            });
        }
        Command::Send => {
            let _ = event_tx.send(BrokerEvent::Sent {
                destination: frame
                    .get_header("destination")
                    .unwrap_or_default()
                    .to_string(),
                body: frame.body.clone(),
            });
        }
        Command::Disconnect => {
            let _ = event_tx.send(BrokerEvent::Disconnected);
        }
        _ => {}
    }
    Ok(())
}
