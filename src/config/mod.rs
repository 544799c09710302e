// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Config loader and validator
//
// Loads branchline.yaml, validates structure, and resolves `${VAR}`
// interpolation from the environment.

mod error;
mod interpolation;
mod loader;
mod raw;
mod source;
mod types;

pub use error::ConfigError;
pub use interpolation::{resolve_variables, resolve_with};
pub use loader::load_config;
pub use source::{ConfigSource, FileSource, StringSource};
pub use types::{ApiConfig, AuthConfig, ChatConfig, Config};
