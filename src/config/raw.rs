// Raw YAML deserialization types (internal)
// Kept separate from the public Config structs: variable interpolation
// and validation happen between the raw and the public form.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub branchline: String,
    pub api: RawApiConfig,
    pub auth: Option<RawAuthConfig>,
    pub chat: Option<RawChatConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawApiConfig {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAuthConfig {
    pub token: Option<String>,
    pub token_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawChatConfig {
    pub default_title: Option<String>,
}
