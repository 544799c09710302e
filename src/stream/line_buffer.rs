// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Line buffer
//
// Accumulates raw transport bytes and yields complete `\n`-terminated
// lines. Splitting happens on bytes, before text decoding: `\n` never
// occurs inside a multi-byte UTF-8 sequence, so a character split
// across two chunks stays pending until its line is complete.

/// Incremental splitter for newline-delimited text.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line completed by it, in order.
    ///
    /// Lines do not include their terminator. Invalid UTF-8 is decoded
    /// with replacement characters rather than rejected.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        // Only the new bytes can hold a terminator; the pending tail was
        // already scanned when it arrived.
        let Some(offset) = chunk.iter().rposition(|b| *b == b'\n') else {
            self.pending.extend_from_slice(chunk);
            return Vec::new();
        };
        let last_newline = self.pending.len() + offset;
        self.pending.extend_from_slice(chunk);

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard the unterminated tail at end-of-stream, returning its size.
    pub fn finish(self) -> usize {
        self.pending.len()
    }
}
