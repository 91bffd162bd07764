//! # matchpoint-realtime
//!
//! The realtime half of the chat client: a STOMP-over-WebSocket transport
//! adapter (one logical connection, per-room subscriptions, fire-and-forget
//! publish) and the reconnection controller that wraps it with bounded
//! exponential backoff and a terminal degraded mode.

pub mod protocol;
pub mod reconnect;
pub mod transport;

pub use protocol::{Command, Frame, FrameParseError};
pub use reconnect::{Connect, ReconnectController, SessionState};
pub use transport::{StompTransport, Unsubscribe};
