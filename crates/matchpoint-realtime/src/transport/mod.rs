//! STOMP transport adapter

mod stomp_transport;
mod subscription;

pub use stomp_transport::StompTransport;
pub use subscription::Unsubscribe;

pub(crate) use subscription::{Shared, SubscriptionEntry};
