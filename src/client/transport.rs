// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Transport seam
//
// The chat client never talks to reqwest directly: requests go through
// an injected `HttpSender`, so tests can script responses and callers
// can swap the HTTP stack.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::pin::Pin;

/// Chunked response body as delivered by the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Sends HTTP requests to the chat backend.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// ---------------------------------------------------------------------------
// Transport types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout_ms: Option<u64>,
    /// Deliver the body incrementally instead of buffering it.
    pub stream: bool,
}

pub enum HttpBody {
    Full(Bytes),
    Stream(ByteStream),
    /// The response carried no body at all.
    Empty,
}

impl HttpBody {
    /// Turn any body into a chunk stream. `Empty` yields no chunks.
    pub fn into_stream(self) -> ByteStream {
        match self {
            HttpBody::Full(bytes) => {
                Box::pin(futures_util::stream::once(async move { Ok::<_, HttpError>(bytes) }))
            }
            HttpBody::Stream(stream) => stream,
            HttpBody::Empty => {
                Box::pin(futures_util::stream::empty::<Result<Bytes, HttpError>>())
            }
        }
    }

    /// Read the whole body as text, keeping whatever arrived before a read error.
    pub async fn into_text(self) -> String {
        let mut stream = self.into_stream();
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => buf.extend_from_slice(&bytes),
                Err(e) => {
                    tracing::debug!(error = %e, "body read stopped early");
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: HttpBody,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
}

// ---------------------------------------------------------------------------
// Reqwest HTTP sender
// ---------------------------------------------------------------------------

pub struct ReqwestHttpSender {
    client: reqwest::Client,
}

impl ReqwestHttpSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttpSender {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(e.to_string())
    } else {
        HttpError::Transport(e.to_string())
    }
}

#[async_trait]
impl HttpSender for ReqwestHttpSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut req = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body);

        if let Some(timeout_ms) = request.timeout_ms {
            req = req.timeout(std::time::Duration::from_millis(timeout_ms));
        }

        let resp = req.send().await.map_err(map_reqwest_error)?;

        let status = resp.status();
        let headers = resp.headers().clone();

        if request.stream {
            let stream = resp.bytes_stream().map_err(map_reqwest_error);
            Ok(HttpResponse {
                status,
                headers,
                body: HttpBody::Stream(Box::pin(stream)),
            })
        } else {
            let body = resp.bytes().await.map_err(map_reqwest_error)?;
            Ok(HttpResponse {
                status,
                headers,
                body: HttpBody::Full(body),
            })
        }
    }
}
