//! Integration test utilities for the chat session manager
//!
//! This crate provides an in-process mock REST backend and a mock STOMP
//! broker so end-to-end tests exercise the real client stack over loopback.

pub mod broker;
pub mod fixtures;

pub use broker::{BrokerEvent, MockBroker};
pub use fixtures::*;
pub use rest_mock::MockRestServer;
