//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
///
/// Raised at the wire-normalization boundary when a payload cannot be mapped
/// to a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Message payload is missing an id")]
    MissingMessageId,

    #[error("Message payload is missing content")]
    MissingContent,

    #[error("Message payload is missing a timestamp")]
    MissingTimestamp,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Room payload is missing an id")]
    MissingRoomId,
}

impl DomainError {
    /// Get error code for logging and error surfaces
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingMessageId => "MISSING_MESSAGE_ID",
            Self::MissingContent => "MISSING_CONTENT",
            Self::MissingTimestamp => "MISSING_TIMESTAMP",
            Self::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            Self::MissingRoomId => "MISSING_ROOM_ID",
        }
    }
}
