// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

pub mod client;
pub mod config;
pub mod conversation;
pub mod history;
pub mod stream;
