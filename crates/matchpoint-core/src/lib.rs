//! # matchpoint-core
//!
//! Domain layer for the Matchpoint chat client: canonical message and room
//! records, the wire-shape normalization boundary, and the cursor-pagination
//! value object. This crate has zero dependencies on I/O (HTTP, WebSocket).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{sender_display_flags, ChatMessage, ChatRoom, WireMessage, WireRoom};
pub use error::DomainError;
pub use value_objects::CursorPage;
