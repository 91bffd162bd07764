//! Application error types
//!
//! Unified error handling for the whole client. Transport and network errors
//! are caught at the subsystem boundary and converted into state the UI layer
//! consumes; nothing here is allowed to escape as an unhandled panic.

use matchpoint_core::DomainError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Realtime transport errors
    #[error("Transport connection failed: {0}")]
    TransportConnection(String),

    #[error("Transport protocol error: {0}")]
    TransportProtocol(String),

    #[error("Not connected to the realtime channel")]
    NotConnected,

    #[error("Already subscribed to room {0}")]
    AlreadySubscribed(i64),

    // REST errors
    #[error("History fetch failed: {0}")]
    HistoryFetch(String),

    // Credential errors
    #[error("No stored credential")]
    MissingCredential,

    #[error("Credential decode failed: {0}")]
    CredentialDecode(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors (wire normalization)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Get error code for logging and UI error surfaces
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransportConnection(_) => "TRANSPORT_CONNECTION",
            Self::TransportProtocol(_) => "TRANSPORT_PROTOCOL",
            Self::NotConnected => "NOT_CONNECTED",
            Self::AlreadySubscribed(_) => "ALREADY_SUBSCRIBED",
            Self::HistoryFetch(_) => "HISTORY_FETCH",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::CredentialDecode(_) => "CREDENTIAL_DECODE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if the user can stay in place with an inline affordance
    ///
    /// Recoverable errors keep the current view (retry button, "cannot send"
    /// banner); the rest redirect to a generic error view.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TransportConnection(_)
                | Self::TransportProtocol(_)
                | Self::NotConnected
                | Self::HistoryFetch(_)
                | Self::MissingCredential
                | Self::CredentialDecode(_)
        )
    }

    /// Check if this error means the realtime connection itself is broken
    ///
    /// Distinguishes "connection broken" (retry per backoff policy) from "one
    /// destination invalid" (log and keep the session).
    #[must_use]
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, Self::TransportConnection(_))
    }

    /// Create a transport connection error
    #[must_use]
    pub fn transport(msg: impl fmt::Display) -> Self {
        Self::TransportConnection(msg.to_string())
    }

    /// Create a history fetch error
    #[must_use]
    pub fn history_fetch(msg: impl fmt::Display) -> Self {
        Self::HistoryFetch(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
