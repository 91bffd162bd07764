//! STOMP protocol definitions
//!
//! Defines the frame subset the broker speaks: commands, headers, encoding,
//! and parsing.

mod frame;

pub use frame::{Command, Frame, FrameParseError};
