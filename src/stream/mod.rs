// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Event-stream decoding
//
// Responsibilities:
// - Split raw transport chunks into newline-terminated lines
// - Extract `data: ` payloads and parse them as JSON
// - Classify payloads into text, branch, done and error events
// - Fold text deltas into the finished message
// - Reconcile the session id against server-issued ids and branches
// - Stop at the first error event; drop malformed lines and continue

mod accumulator;
mod classifier;
mod driver;
mod extractor;
mod line_buffer;
mod observer;
mod reconciler;
mod types;

pub use accumulator::Accumulator;
pub use classifier::{Classified, EventClassifier, KeyPresenceClassifier};
pub use driver::{Flow, StreamDecoder, StreamDriver};
pub use extractor::{extract, Extracted};
pub use line_buffer::LineBuffer;
pub use observer::{NoopObserver, StreamObserver, TracingObserver};
pub use reconciler::SessionReconciler;
pub use types::{
    BranchCandidate, SkipReason, StreamError, StreamEvent, StreamOutcome, Termination,
    DATA_PREFIX, DEFAULT_BRANCH_TITLE, ERROR_MESSAGE_PREFIX, NETWORK_ERROR_PREFIX,
};

#[cfg(test)]
mod tests;
