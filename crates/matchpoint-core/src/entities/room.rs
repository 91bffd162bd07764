//! Chat room entity - a 1:1 channel tied to a match

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::entities::message::parse_wire_timestamp;
use crate::error::DomainError;

/// Canonical chat room
///
/// Created server-side when two users agree on a match; the client only reads
/// its room list and flips the unread count locally after a mark-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRoom {
    pub id: i64,
    pub match_id: i64,
    pub partner_id: i64,
    pub partner_nickname: String,
    pub partner_avatar: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: u32,
}

impl ChatRoom {
    /// Check if the room has messages the user has not seen
    #[inline]
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Zero the unread count after a successful mark-read call
    pub fn mark_read_local(&mut self) {
        self.unread_count = 0;
    }
}

/// Raw room payload from the room-list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRoom {
    #[serde(default, alias = "id")]
    pub room_id: Option<i64>,
    pub match_id: i64,
    pub partner_id: i64,
    #[serde(default)]
    pub partner_nickname: Option<String>,
    #[serde(default, alias = "partnerProfileImage")]
    pub partner_avatar: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
    #[serde(default)]
    pub unread_count: Option<u32>,
}

impl TryFrom<WireRoom> for ChatRoom {
    type Error = DomainError;

    fn try_from(wire: WireRoom) -> Result<Self, Self::Error> {
        let id = wire.room_id.ok_or(DomainError::MissingRoomId)?;
        let last_message_at = wire
            .last_message_at
            .as_deref()
            .map(parse_wire_timestamp)
            .transpose()?;

        Ok(Self {
            id,
            match_id: wire.match_id,
            partner_id: wire.partner_id,
            partner_nickname: wire.partner_nickname.unwrap_or_default(),
            partner_avatar: wire.partner_avatar,
            last_message: wire.last_message,
            last_message_at,
            unread_count: wire.unread_count.unwrap_or(0),
        })
    }
}
