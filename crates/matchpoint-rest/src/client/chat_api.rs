//! Chat REST API client
//!
//! Bearer credentials are read from the injected provider on every request;
//! a token refreshed elsewhere in the app is used on the next call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use matchpoint_common::{AppError, AppResult, CredentialProvider, RestConfig};
use matchpoint_core::{ChatMessage, ChatRoom, CursorPage, WireMessage, WireRoom};

use crate::backend::HistoryBackend;
use crate::dto::{ApiEnvelope, CreateRoomRequest, PageEnvelope};

/// REST client for the chat backend
pub struct ChatApi {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ChatApi {
    /// Build a client from configuration
    pub fn new(config: &RestConfig, credentials: Arc<dyn CredentialProvider>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AppError::internal)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start an authenticated request, reading the token at call time
    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(AppError::MissingCredential)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::history_fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::history_fetch(format!("invalid response body: {e}")))
    }

    async fn send_empty(&self, request: RequestBuilder) -> AppResult<()> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::history_fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(())
    }
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    // Keep only a short snippet so logs stay readable
    let snippet: String = body.chars().take(200).collect();
    AppError::history_fetch(format!("{status}: {snippet}"))
}

fn cursor_query(cursor: Option<&str>, size: u32) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(2);
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor.to_string()));
    }
    query.push(("size", size.to_string()));
    query
}

#[async_trait]
impl HistoryBackend for ChatApi {
    async fn list_my_rooms(
        &self,
        cursor: Option<&str>,
        size: u32,
    ) -> AppResult<CursorPage<ChatRoom>> {
        let request = self
            .request(Method::GET, "/v1/chat/rooms/my")?
            .query(&cursor_query(cursor, size));
        let page: PageEnvelope<WireRoom> = self.send_json(request).await?;

        tracing::debug!(rooms = page.data.len(), has_next = page.pagination.has_next, "Fetched room list page");

        CursorPage::new(page.data, page.pagination.next_cursor, page.pagination.has_next)
            .try_map(ChatRoom::try_from)
            .map_err(AppError::from)
    }

    async fn message_history(
        &self,
        room_id: i64,
        cursor: Option<&str>,
        size: u32,
    ) -> AppResult<CursorPage<ChatMessage>> {
        let path = format!("/v1/chat/rooms/{room_id}/messages");
        let request = self
            .request(Method::GET, &path)?
            .query(&cursor_query(cursor, size));
        let page: PageEnvelope<WireMessage> = self.send_json(request).await?;

        tracing::debug!(
            room_id,
            messages = page.data.len(),
            has_next = page.pagination.has_next,
            "Fetched history page"
        );

        CursorPage::new(page.data, page.pagination.next_cursor, page.pagination.has_next)
            .try_map(ChatMessage::try_from)
            .map_err(AppError::from)
    }

    async fn create_room(&self, match_id: i64, guest_id: i64) -> AppResult<ChatRoom> {
        let request = self
            .request(Method::POST, "/v1/chat/rooms")?
            .json(&CreateRoomRequest { match_id, guest_id });
        let envelope: ApiEnvelope<WireRoom> = self.send_json(request).await?;

        let room = ChatRoom::try_from(envelope.data)?;
        tracing::info!(room_id = room.id, match_id, "Created chat room");
        Ok(room)
    }

    async fn mark_room_read(&self, room_id: i64) -> AppResult<()> {
        let path = format!("/v1/chat/rooms/{room_id}/read");
        let request = self.request(Method::PATCH, &path)?;
        self.send_empty(request).await?;

        tracing::debug!(room_id, "Marked room as read");
        Ok(())
    }
}
