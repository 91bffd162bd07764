//! Domain entities - core chat objects

mod message;
mod room;

pub use message::{parse_wire_timestamp, sender_display_flags, ChatMessage, WireMessage};
pub use room::{ChatRoom, WireRoom};
