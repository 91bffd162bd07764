//! Shared fixtures for integration tests

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};

use matchpoint_common::{RealtimeConfig, ReconnectConfig, RestConfig};

/// Timestamp base shared by all message fixtures
fn fixture_epoch() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

#[derive(Serialize)]
struct TokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Mint a signed token carrying `user_id` as its subject
///
/// The client never verifies the signature, so any secret works here.
pub fn mint_token(user_id: i64) -> String {
    let now = Utc::now().timestamp();
    encode(
        &Header::default(),
        &TokenClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + 3600,
        },
        &EncodingKey::from_secret(b"integration-test-secret"),
    )
    .expect("token encoding cannot fail")
}

/// Backend-shaped message payload at a fixed offset (seconds) from the epoch
pub fn message_json(id: i64, room_id: i64, sender_id: i64, offset_secs: i64) -> Value {
    let sent_at = fixture_epoch() + Duration::seconds(offset_secs);
    json!({
        "messageId": id,
        "roomId": room_id,
        "senderId": sender_id,
        "senderNickname": format!("player {sender_id}"),
        "message": format!("message {id}"),
        "sentAt": sent_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "isRead": false
    })
}

/// Backend-shaped room payload
pub fn room_json(id: i64, match_id: i64, partner_id: i64, unread: u32) -> Value {
    json!({
        "roomId": id,
        "matchId": match_id,
        "partnerId": partner_id,
        "partnerNickname": format!("partner {partner_id}"),
        "unreadCount": unread
    })
}

/// Cursor-paginated response envelope
pub fn page_json(items: Vec<Value>, next_cursor: Option<&str>, has_next: bool) -> Value {
    json!({
        "data": items,
        "pagination": {
            "nextCursor": next_cursor,
            "hasNext": has_next
        }
    })
}

/// REST config pointing at a mock backend
pub fn rest_config(base_url: &str) -> RestConfig {
    RestConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        page_size: 20,
    }
}

/// Realtime config pointing at a mock broker
pub fn realtime_config(ws_url: &str) -> RealtimeConfig {
    RealtimeConfig {
        url: ws_url.to_string(),
        connect_timeout_secs: 5,
        topic_prefix: "/topic/chat/room".to_string(),
        send_destination: "/app/chat/message".to_string(),
    }
}

/// Backoff config with millisecond delays so retry tests finish quickly
pub fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        max_retries: 3,
        base_delay_ms: 10,
        max_delay_ms: 40,
    }
}
