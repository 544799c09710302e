// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

/// Append-only collector for text deltas.
///
/// Fragments are kept in arrival order and joined once, so the cost of
/// finalising is linear in the total text regardless of how many
/// deltas arrived.
#[derive(Debug, Default)]
pub struct Accumulator {
    fragments: Vec<String>,
    total_len: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.total_len += text.len();
        self.fragments.push(text);
    }

    /// Number of fragments received so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn len(&self) -> usize {
        self.total_len
    }

    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    pub fn finalize(self) -> String {
        let mut out = String::with_capacity(self.total_len);
        for fragment in &self.fragments {
            out.push_str(fragment);
        }
        out
    }
}
