// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Stream types
//
// Core types for event-stream decoding: classified events, skip
// reasons, the terminal outcome record, and driver errors.

use serde::Serialize;

/// Prefix of every line that carries an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// Title used when a branch signal carries no usable `suggested_title`.
pub const DEFAULT_BRANCH_TITLE: &str = "New Chat";

/// Prefix applied to an upstream error event's text before it is shown.
pub const ERROR_MESSAGE_PREFIX: &str = "⚠️ ";

/// Prefix applied to transport-level failure descriptions.
pub const NETWORK_ERROR_PREFIX: &str = "Network error: ";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A server suggestion that the conversation continue in a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchCandidate {
    pub new_session_id: String,
    pub suggested_title: String,
}

/// One decoded protocol event.
///
/// A single payload may decode into more than one event when its keys
/// co-occur; see [`super::Classified`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of assistant text, optionally tagged with the session it belongs to.
    TextDelta {
        text: String,
        session_id: Option<String>,
    },
    /// The server moved the conversation to a new session.
    Branch(BranchCandidate),
    /// The server finished the response. Carries no state change.
    Done { session_id: Option<String> },
    /// The server reported a failure; consumption stops after this payload.
    Error { message: String },
}

impl StreamEvent {
    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::TextDelta { .. } => "text_delta",
            StreamEvent::Branch(_) => "branch",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

/// Why a line produced no events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line does not start with `data: `.
    NotData,
    /// The payload after `data: ` is blank.
    EmptyPayload,
    /// The payload is not valid JSON.
    Malformed { error: String, payload: String },
    /// A payload key was present but its value could not be used.
    InvalidField { field: &'static str, reason: String },
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NotData => "not_data",
            SkipReason::EmptyPayload => "empty_payload",
            SkipReason::Malformed { .. } => "malformed",
            SkipReason::InvalidField { .. } => "invalid_field",
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a stream consumption ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The transport signalled end-of-stream with no prior error event.
    EndOfStream,
    /// An error event stopped consumption early.
    ErrorStop,
    /// The request or the body read failed before the stream completed.
    TransportFailure,
}

/// The single result of consuming one streamed response.
///
/// Every failure layer produces this same shape so callers only need to
/// distinguish "branched", "session changed" and "plain message".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamOutcome {
    pub session_id: Option<String>,
    pub branch_candidate: Option<BranchCandidate>,
    pub message: String,
}

impl StreamOutcome {
    /// Outcome for a failure below the event layer.
    ///
    /// The session id is the one the caller started with and no branch
    /// candidate survives.
    pub fn network_error(session_id: Option<String>, description: impl AsRef<str>) -> Self {
        Self {
            session_id,
            branch_candidate: None,
            message: format!("{NETWORK_ERROR_PREFIX}{}", description.as_ref()),
        }
    }

    pub fn is_branch(&self) -> bool {
        self.branch_candidate.is_some()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that abort stream consumption.
///
/// Malformed lines and upstream error events are not errors at this
/// level: the former are skipped, the latter end the stream normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("stream read failed: {0}")]
    Transport(String),
}
