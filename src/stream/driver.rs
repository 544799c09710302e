// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Stream driver
//
// Pulls chunks from the transport one at a time, splits them into
// lines, and routes each line through extraction and classification
// into the accumulator and the session reconciler. Consumption ends at
// transport end-of-stream or at the first error event.

use super::accumulator::Accumulator;
use super::classifier::EventClassifier;
use super::extractor::{extract, Extracted};
use super::line_buffer::LineBuffer;
use super::observer::StreamObserver;
use super::reconciler::SessionReconciler;
use super::types::{StreamError, StreamEvent, StreamOutcome, Termination, ERROR_MESSAGE_PREFIX};
use std::fmt::Display;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};

/// Whether the decoder wants more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

// ---------------------------------------------------------------------------
// Decoder (synchronous core)
// ---------------------------------------------------------------------------

/// Per-stream decoding state.
///
/// Owns its own line buffer, accumulator and reconciler; nothing is
/// shared between streams.
pub struct StreamDecoder<'a> {
    classifier: &'a dyn EventClassifier,
    observer: &'a dyn StreamObserver,
    lines: LineBuffer,
    accumulator: Accumulator,
    reconciler: SessionReconciler,
    error: Option<String>,
}

impl<'a> StreamDecoder<'a> {
    pub fn new(
        classifier: &'a dyn EventClassifier,
        observer: &'a dyn StreamObserver,
        initial_session: Option<String>,
    ) -> Self {
        Self {
            classifier,
            observer,
            lines: LineBuffer::new(),
            accumulator: Accumulator::new(),
            reconciler: SessionReconciler::new(initial_session),
            error: None,
        }
    }

    /// Feed one transport chunk.
    ///
    /// Once an error event has been seen this returns `Flow::Stop` and
    /// ignores all further input, including the rest of the same chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Flow {
        if self.error.is_some() {
            return Flow::Stop;
        }

        for line in self.lines.feed(chunk) {
            if self.process_line(&line) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn process_line(&mut self, line: &str) -> Flow {
        self.observer.on_line(line);

        let payload = match extract(line) {
            Extracted::Payload(payload) => payload,
            Extracted::Skip(reason) => {
                self.observer.on_skip(&reason);
                return Flow::Continue;
            }
        };

        let classified = self.classifier.classify(&payload);
        for reason in &classified.rejected {
            self.observer.on_skip(reason);
        }

        for event in classified.into_events() {
            self.observer.on_event(&event);
            match event {
                StreamEvent::TextDelta { text, session_id } => {
                    self.reconciler.observe_text(session_id.as_deref());
                    self.accumulator.append(text);
                }
                StreamEvent::Branch(candidate) => self.reconciler.observe_branch(candidate),
                StreamEvent::Done { .. } => {}
                StreamEvent::Error { message } => {
                    self.error = Some(message);
                    return Flow::Stop;
                }
            }
        }
        Flow::Continue
    }

    /// Session id as currently reconciled.
    pub fn session_id(&self) -> Option<&str> {
        self.reconciler.session_id()
    }

    /// Assemble the outcome. Any unterminated trailing line is dropped.
    pub fn finish(self) -> (StreamOutcome, Termination) {
        let dropped = self.lines.finish();
        if dropped > 0 {
            tracing::debug!(dropped_bytes = dropped, "discarding unterminated final line");
        }

        let (session_id, branch_candidate) = self.reconciler.result();
        match self.error {
            Some(error) => (
                StreamOutcome {
                    session_id,
                    branch_candidate,
                    message: format!("{ERROR_MESSAGE_PREFIX}{error}"),
                },
                Termination::ErrorStop,
            ),
            None => (
                StreamOutcome {
                    session_id,
                    branch_candidate,
                    message: self.accumulator.finalize(),
                },
                Termination::EndOfStream,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Driver (async loop)
// ---------------------------------------------------------------------------

/// Consumes a chunked byte stream into a [`StreamOutcome`].
///
/// The classifier and observer are injected so the driver stays
/// independent of the payload schema and of the logging backend.
pub struct StreamDriver {
    classifier: Arc<dyn EventClassifier>,
    observer: Arc<dyn StreamObserver>,
}

impl StreamDriver {
    pub fn new(classifier: Arc<dyn EventClassifier>, observer: Arc<dyn StreamObserver>) -> Self {
        Self {
            classifier,
            observer,
        }
    }

    /// Read `input` to completion or to the first error event.
    ///
    /// Only one chunk is requested at a time. A failed chunk read aborts
    /// with [`StreamError::Transport`]; mapping that to a user-facing
    /// outcome is the caller's job. Dropping the returned future stops
    /// consumption and drops `input` with it.
    pub async fn drive<S, E>(
        &self,
        input: S,
        initial_session: Option<String>,
    ) -> Result<StreamOutcome, StreamError>
    where
        S: Stream<Item = Result<bytes::Bytes, E>>,
        E: Display,
    {
        tokio::pin!(input);

        let mut decoder = StreamDecoder::new(
            self.classifier.as_ref(),
            self.observer.as_ref(),
            initial_session,
        );

        while let Some(chunk) = input.next().await {
            let chunk = chunk.map_err(|e| StreamError::Transport(e.to_string()))?;
            if decoder.feed(&chunk) == Flow::Stop {
                break;
            }
        }

        let (outcome, termination) = decoder.finish();
        self.observer.on_finish(&outcome, termination);
        Ok(outcome)
    }
}
