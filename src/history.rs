// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Chat history endpoints
//
// The session list a caller refreshes after a branch or a session
// change, and the stored messages of a single session.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{ChatClient, HttpError, HttpRequest};

/// Path of the history endpoint, relative to the base URL.
pub const HISTORY_PATH: &str = "/chat/history";

const SUMMARY_HEADING: &str = "**Conversation Summary:**";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One conversation as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub updated_at: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message as shown in the conversation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// A message created locally, stamped now with a fresh id.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Some(Utc::now()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("history request returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid history response: {0}")]
    Decode(String),

    #[error("invalid history URL: {0}")]
    Url(String),
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ChatListBody {
    #[serde(default)]
    chats: Option<Vec<ChatSession>>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionBody {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    messages: Option<Vec<StoredMessage>>,
}

#[derive(Debug, Deserialize)]
struct StoredMessage {
    content: String,
    role: Role,
    #[serde(default)]
    timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl ChatClient {
    /// List the caller's conversations. A body without `chats` is an empty list.
    pub async fn fetch_chats(&self) -> Result<Vec<ChatSession>, HistoryError> {
        let url = self.url(HISTORY_PATH);
        let body: ChatListBody = self.get_json(url).await?;
        Ok(body.chats.unwrap_or_default())
    }

    /// Load the stored messages of one conversation.
    ///
    /// Message ids are `<session_id>-<index>`. A non-blank summary is
    /// appended as a final assistant message.
    pub async fn load_chat(&self, session_id: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        let mut url =
            Url::parse(&self.url(HISTORY_PATH)).map_err(|e| HistoryError::Url(e.to_string()))?;
        url.query_pairs_mut().append_pair("session_id", session_id);

        let body: SessionBody = self.get_json(url.to_string()).await?;

        let mut messages: Vec<ChatMessage> = body
            .messages
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, msg)| ChatMessage {
                id: format!("{session_id}-{index}"),
                content: msg.content,
                role: msg.role,
                timestamp: msg.timestamp.as_deref().and_then(parse_timestamp),
            })
            .collect();

        if let Some(summary) = body.summary.filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage {
                id: format!("{session_id}-summary"),
                content: format!("{SUMMARY_HEADING}\n\n{summary}"),
                role: Role::Assistant,
                timestamp: Some(Utc::now()),
            });
        }

        tracing::debug!(session_id, count = messages.len(), "loaded chat history");
        Ok(messages)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, HistoryError> {
        let mut headers = self.auth_headers().await;
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self
            .send(HttpRequest {
                method: Method::GET,
                url,
                headers,
                body: bytes::Bytes::new(),
                timeout_ms: self.timeout_ms(),
                stream: false,
            })
            .await?;

        let status = response.status;
        let text = response.body.into_text().await;
        if !status.is_success() {
            return Err(HistoryError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| HistoryError::Decode(e.to_string()))
    }
}

/// Parse a backend timestamp: RFC 3339, or a naive ISO-8601 value taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable message timestamp");
            None
        }
    }
}
