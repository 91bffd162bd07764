//! Chat message entity and its wire-shape normalization boundary
//!
//! A message reaches the client through two origins with different field
//! names: the REST history endpoint (`chatId` / `content` / `createdAt`) and
//! the realtime broker push (`messageId` / `message` / `sentAt`). Both shapes
//! deserialize into [`WireMessage`]; everything past [`ChatMessage::try_from`]
//! sees one canonical record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::DomainError;

/// Canonical chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    /// Empty when the origin (realtime echo) omits it
    pub sender_nickname: String,
    pub sender_avatar: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Get a truncated preview of the message (for room-list rows)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }

    /// Check if message content is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Raw message payload as delivered by either origin
///
/// Serde aliases absorb the REST/realtime field-name asymmetry; the optional
/// fields are resolved (or rejected) by the `TryFrom` conversion below.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(default, alias = "messageId")]
    pub chat_id: Option<i64>,
    pub room_id: i64,
    pub sender_id: i64,
    #[serde(default)]
    pub sender_nickname: Option<String>,
    #[serde(default, alias = "senderProfileImage")]
    pub sender_avatar: Option<String>,
    #[serde(default, alias = "message")]
    pub content: Option<String>,
    #[serde(default, alias = "sentAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_read: Option<bool>,
    #[serde(default)]
    pub read_at: Option<String>,
}

impl TryFrom<WireMessage> for ChatMessage {
    type Error = DomainError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let id = wire.chat_id.ok_or(DomainError::MissingMessageId)?;
        let content = wire.content.ok_or(DomainError::MissingContent)?;
        let created_at =
            parse_wire_timestamp(&wire.created_at.ok_or(DomainError::MissingTimestamp)?)?;
        let read_at = wire
            .read_at
            .as_deref()
            .map(parse_wire_timestamp)
            .transpose()?;

        Ok(Self {
            id,
            room_id: wire.room_id,
            sender_id: wire.sender_id,
            sender_nickname: wire.sender_nickname.unwrap_or_default(),
            sender_avatar: wire.sender_avatar,
            content,
            created_at,
            is_read: wire.is_read.unwrap_or(false),
            read_at,
        })
    }
}

/// Parse an origin-dependent timestamp string
///
/// The backend emits RFC 3339 on some routes and a zone-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]` local-datetime on others; the latter is taken
/// as UTC.
pub fn parse_wire_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| DomainError::InvalidTimestamp(raw.to_string()))
}

/// Compute sender-display flags for an ordered timeline
///
/// `true` marks the first message of each run of consecutive same-sender
/// messages; the UI suppresses the repeated avatar/nickname on the rest.
/// Pure function of the ordering, never mutates stored data.
#[must_use]
pub fn sender_display_flags(messages: &[ChatMessage]) -> Vec<bool> {
    messages
        .iter()
        .enumerate()
        .map(|(i, msg)| i == 0 || messages[i - 1].sender_id != msg.sender_id)
        .collect()
}
