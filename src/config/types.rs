// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::stream::DEFAULT_BRANCH_TITLE;

/// Top-level parsed and validated config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Contract version. Always "v1".
    pub version: String,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
}

/// Where the chat backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. "https://api.example.edu".
    pub base_url: String,
    /// Whole-request timeout, including reading the streamed body.
    pub timeout_ms: Option<u64>,
}

/// Where the bearer token comes from. `token` wins over `token_file`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Title used for branches that arrive without a suggested title.
    pub default_title: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_BRANCH_TITLE.to_string(),
        }
    }
}
