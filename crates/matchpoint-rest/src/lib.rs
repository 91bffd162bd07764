//! # matchpoint-rest
//!
//! REST client for the chat backend: paginated room list, paginated message
//! history, room creation, and read receipts. The realtime channel lives in
//! `matchpoint-realtime`; this crate is the "history" side of reconciliation.

pub mod backend;
pub mod client;
pub mod dto;

pub use backend::HistoryBackend;
pub use client::ChatApi;
