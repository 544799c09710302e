// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::path::PathBuf;

/// Source of the opaque bearer token sent with every request.
///
/// The token is looked up per request, so a store backed by mutable
/// storage picks up a re-login without rebuilding the client.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// Never supplies a token; requests go out unauthenticated.
pub struct NoTokenStore;

#[async_trait]
impl TokenStore for NoTokenStore {
    async fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, typically taken from config.
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }
}

#[async_trait]
impl TokenStore for StaticTokenStore {
    async fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Reads the token from a file written by whatever performs the login.
///
/// A missing or blank file means no token. The read goes through
/// `tokio::fs`, so it never blocks the runtime thread driving a request.
pub struct FileTokenStore {
    pub path: PathBuf,
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no token file");
                None
            }
        }
    }
}
