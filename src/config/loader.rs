// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use super::error::ConfigError;
use super::interpolation::resolve_variables;
use super::raw;
use super::source::ConfigSource;
use super::types::*;

/// Load and validate a branchline config from the given source.
///
/// Steps:
/// 1. Read raw YAML from source
/// 2. Parse YAML into raw deserialization types
/// 3. Validate the contract version
/// 4. Resolve variable interpolation in string fields
/// 5. Validate values and build the typed Config
pub fn load_config(source: &dyn ConfigSource) -> Result<Config, ConfigError> {
    let raw_yaml = source.load()?;
    let raw: raw::RawConfig = serde_yaml::from_str(&raw_yaml)?;

    if raw.branchline != "v1" {
        return Err(ConfigError::Validation(format!(
            "unsupported contract version \"{}\", expected \"v1\"",
            raw.branchline
        )));
    }

    let api = build_api_config(raw.api)?;
    let auth = build_auth_config(raw.auth)?;
    let chat = build_chat_config(raw.chat)?;

    Ok(Config {
        version: raw.branchline,
        api,
        auth,
        chat,
    })
}

fn build_api_config(raw: raw::RawApiConfig) -> Result<ApiConfig, ConfigError> {
    let base_url = resolve_variables(raw.base_url.trim())?;
    let base_url = base_url.trim_end_matches('/').to_string();

    if base_url.is_empty() {
        return Err(ConfigError::Validation("api.base_url must not be empty".to_string()));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::Validation(format!(
            "api.base_url \"{base_url}\" must start with http:// or https://"
        )));
    }
    if raw.timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "api.timeout_ms must be greater than zero".to_string(),
        ));
    }

    Ok(ApiConfig {
        base_url,
        timeout_ms: raw.timeout_ms,
    })
}

fn build_auth_config(raw: Option<raw::RawAuthConfig>) -> Result<AuthConfig, ConfigError> {
    let raw = match raw {
        Some(r) => r,
        None => return Ok(AuthConfig::default()),
    };

    // An empty token (e.g. `${TOKEN}` set to "") means "no token".
    let token = raw
        .token
        .map(|t| resolve_variables(&t))
        .transpose()?
        .filter(|t| !t.trim().is_empty());

    let token_file = raw
        .token_file
        .map(|p| resolve_variables(&p))
        .transpose()?
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    Ok(AuthConfig { token, token_file })
}

fn build_chat_config(raw: Option<raw::RawChatConfig>) -> Result<ChatConfig, ConfigError> {
    let raw = match raw {
        Some(r) => r,
        None => return Ok(ChatConfig::default()),
    };

    match raw.default_title {
        Some(title) if title.trim().is_empty() => Err(ConfigError::Validation(
            "chat.default_title must not be blank".to_string(),
        )),
        Some(title) => Ok(ChatConfig {
            default_title: resolve_variables(&title)?,
        }),
        None => Ok(ChatConfig::default()),
    }
}
