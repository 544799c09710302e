// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

use super::types::{SkipReason, StreamEvent, StreamOutcome, Termination};

/// Observability hook injected into the stream driver.
///
/// The driver reports one call per line processed and one per decoded
/// event or skip. All hooks default to doing nothing.
pub trait StreamObserver: Send + Sync {
    fn on_line(&self, _line: &str) {}

    fn on_skip(&self, _reason: &SkipReason) {}

    fn on_event(&self, _event: &StreamEvent) {}

    fn on_finish(&self, _outcome: &StreamOutcome, _termination: Termination) {}
}

/// Discards every notification.
pub struct NoopObserver;

impl StreamObserver for NoopObserver {}

/// Emits each notification as a structured `tracing` event.
pub struct TracingObserver;

impl StreamObserver for TracingObserver {
    fn on_line(&self, line: &str) {
        tracing::trace!(line_len = line.len(), "stream line");
    }

    fn on_skip(&self, reason: &SkipReason) {
        match reason {
            SkipReason::NotData | SkipReason::EmptyPayload => {
                tracing::trace!(reason = reason.label(), "line skipped");
            }
            SkipReason::Malformed { error, payload } => {
                tracing::warn!(
                    reason = reason.label(),
                    %error,
                    payload_len = payload.len(),
                    "discarding malformed stream payload"
                );
            }
            SkipReason::InvalidField { field, reason: why } => {
                tracing::warn!(reason = reason.label(), field, %why, "discarding stream event");
            }
        }
    }

    fn on_event(&self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { text, session_id } => {
                tracing::trace!(
                    kind = event.kind(),
                    text_len = text.len(),
                    session_id = session_id.as_deref().unwrap_or(""),
                    "stream event"
                );
            }
            StreamEvent::Branch(candidate) => {
                tracing::info!(
                    kind = event.kind(),
                    new_session_id = %candidate.new_session_id,
                    suggested_title = %candidate.suggested_title,
                    "branch signal"
                );
            }
            StreamEvent::Done { session_id } => {
                tracing::debug!(
                    kind = event.kind(),
                    session_id = session_id.as_deref().unwrap_or(""),
                    "stream marked done"
                );
            }
            StreamEvent::Error { message } => {
                tracing::warn!(kind = event.kind(), %message, "upstream error event");
            }
        }
    }

    fn on_finish(&self, outcome: &StreamOutcome, termination: Termination) {
        tracing::info!(
            ?termination,
            session_id = outcome.session_id.as_deref().unwrap_or(""),
            branched = outcome.is_branch(),
            message_len = outcome.message.len(),
            "stream finished"
        );
    }
}
