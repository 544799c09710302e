// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Chat client
//
// Builds the streaming chat request, sends it through the injected
// transport, and hands the body to the stream driver. Every failure
// below the event layer is folded into the same `StreamOutcome` the
// driver produces, so callers handle a single result type.

mod auth;
mod transport;

pub use auth::{FileTokenStore, NoTokenStore, StaticTokenStore, TokenStore};
pub use transport::{
    ByteStream, HttpBody, HttpError, HttpRequest, HttpResponse, HttpSender, ReqwestHttpSender,
};

use crate::config::Config;
use crate::stream::{KeyPresenceClassifier, StreamDriver, StreamOutcome, TracingObserver};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;

/// Path of the streaming chat endpoint, relative to the base URL.
pub const STREAM_PATH: &str = "/chat/stream";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of a streaming chat request.
///
/// `session_id: None` asks the backend to start a new conversation and
/// is sent as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub textbook_id: String,
    pub chapter_id: String,
    pub session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ClientDeps {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
    pub http: Arc<dyn HttpSender>,
    pub tokens: Arc<dyn TokenStore>,
    pub driver: StreamDriver,
}

pub struct ChatClient {
    deps: ClientDeps,
}

impl ChatClient {
    pub fn new_with(deps: ClientDeps) -> Self {
        Self { deps }
    }

    /// Send one message and consume the streamed reply.
    ///
    /// Never fails: transport errors, non-success statuses and a missing
    /// body all come back as a network-error outcome carrying the
    /// caller's original session id and no branch candidate.
    pub async fn stream_message(&self, request: &ChatRequest) -> StreamOutcome {
        let initial = request.session_id.clone();

        let body = match serde_json::to_vec(request) {
            Ok(body) => Bytes::from(body),
            Err(e) => return StreamOutcome::network_error(initial, e.to_string()),
        };

        let mut headers = self.auth_headers().await;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_request = HttpRequest {
            method: Method::POST,
            url: self.url(STREAM_PATH),
            headers,
            body,
            timeout_ms: self.deps.timeout_ms,
            stream: true,
        };

        tracing::debug!(
            url = %http_request.url,
            session_id = initial.as_deref().unwrap_or(""),
            "sending chat message"
        );

        let response = match self.deps.http.send(http_request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "chat stream request failed");
                return StreamOutcome::network_error(initial, e.to_string());
            }
        };

        if !response.status.is_success() {
            let status = response.status;
            let text = response.body.into_text().await;
            tracing::warn!(%status, body_len = text.len(), "chat stream returned error status");
            return StreamOutcome::network_error(initial, text);
        }

        let body = match response.body {
            HttpBody::Empty => {
                tracing::warn!("chat stream response had no body");
                return StreamOutcome::network_error(initial, "Failed to parse body");
            }
            body => body.into_stream(),
        };

        match self.deps.driver.drive(body, initial.clone()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "chat stream aborted");
                StreamOutcome::network_error(initial, e.to_string())
            }
        }
    }

    pub(crate) fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.deps.base_url, path_and_query)
    }

    /// `Authorization` header when the token store yields a token.
    pub(crate) async fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.deps.tokens.token().await {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("bearer token is not a valid header value; sending without it")
                }
            }
        }
        headers
    }

    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.deps.http.send(request).await
    }

    pub(crate) fn timeout_ms(&self) -> Option<u64> {
        self.deps.timeout_ms
    }
}

// ---------------------------------------------------------------------------
// Public factory for default chat client
// ---------------------------------------------------------------------------

pub fn build_chat_client(config: &Config) -> ChatClient {
    let tokens: Arc<dyn TokenStore> = match (&config.auth.token, &config.auth.token_file) {
        (Some(token), _) => Arc::new(StaticTokenStore::new(token.clone())),
        (None, Some(path)) => Arc::new(FileTokenStore { path: path.clone() }),
        (None, None) => Arc::new(NoTokenStore),
    };

    let classifier = KeyPresenceClassifier::with_default_title(config.chat.default_title.clone());

    ChatClient::new_with(ClientDeps {
        base_url: config.api.base_url.clone(),
        timeout_ms: config.api.timeout_ms,
        http: Arc::new(ReqwestHttpSender::default()),
        tokens,
        driver: StreamDriver::new(Arc::new(classifier), Arc::new(TracingObserver)),
    })
}
