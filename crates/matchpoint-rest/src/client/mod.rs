//! REST client implementation

mod chat_api;

pub use chat_api::ChatApi;
