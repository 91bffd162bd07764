//! # matchpoint-session
//!
//! The chat session manager: merges REST-paginated history with realtime
//! pushes into one ordered, deduplicated timeline per room, keeps the room
//! list, and owns the per-tab transport through an explicitly constructed
//! session root.

pub mod rooms;
pub mod scroll;
pub mod session;
pub mod timeline;


pub use rooms::RoomListController;
pub use scroll::ScrollNotifier;
pub use session::{ChatSession, RoomHandle};
pub use timeline::RoomTimeline;
