// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use super::error::ConfigError;

/// Where branchline.yaml content comes from.
pub trait ConfigSource {
    fn load(&self) -> Result<String, ConfigError>;

    /// Human-readable origin, used in log lines and read errors.
    fn origin(&self) -> String;
}

/// branchline.yaml on disk, typically named by `--config`.
pub struct FileSource {
    pub path: PathBuf,
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            origin: self.origin(),
            source,
        })
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// Inline YAML, for tests and embedders that build config in memory.
pub struct StringSource {
    pub content: String,
}

impl ConfigSource for StringSource {
    fn load(&self) -> Result<String, ConfigError> {
        Ok(self.content.clone())
    }

    fn origin(&self) -> String {
        "<inline>".to_string()
    }
}
