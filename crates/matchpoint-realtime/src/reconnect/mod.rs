//! Reconnection controller

mod controller;

pub use controller::{Connect, ReconnectController, SessionState};
