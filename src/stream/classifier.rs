// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Event classifier
//
// Decodes a parsed payload into the events it carries. Shapes are
// recognised by key presence and are not mutually exclusive: every
// matching shape is decoded, and events are applied in a fixed order
// (text, branch, done, error) so an error on the same payload still
// lets the earlier effects land.

use serde_json::{Map, Value};

use super::types::{BranchCandidate, SkipReason, StreamEvent, DEFAULT_BRANCH_TITLE};

// ---------------------------------------------------------------------------
// Trait: EventClassifier
// ---------------------------------------------------------------------------

/// Turns one parsed payload into zero or more events.
pub trait EventClassifier: Send + Sync {
    fn classify(&self, payload: &Value) -> Classified;
}

/// Every event a payload decoded into, plus any shape that matched but
/// could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub text: Option<StreamEvent>,
    pub branch: Option<StreamEvent>,
    pub done: Option<StreamEvent>,
    pub error: Option<StreamEvent>,
    pub rejected: Vec<SkipReason>,
}

impl Classified {
    /// Events in application order.
    pub fn events(&self) -> impl Iterator<Item = &StreamEvent> {
        [&self.text, &self.branch, &self.done, &self.error]
            .into_iter()
            .flatten()
    }

    pub fn into_events(self) -> impl Iterator<Item = StreamEvent> {
        [self.text, self.branch, self.done, self.error]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.branch.is_none() && self.done.is_none() && self.error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Key-presence classifier
// ---------------------------------------------------------------------------

/// Classifies chat-stream payloads by which keys they carry.
///
/// ```text
/// {"text": "...", "session_id": "..."}                              -> TextDelta
/// {"start_new_chat": true, "new_session_id": "...", "suggested_title": "..."} -> Branch
/// {"done": true, "session_id": "..."}                               -> Done
/// {"error": "..."}                                                  -> Error
/// ```
///
/// Non-object payloads carry no keys and classify as nothing.
pub struct KeyPresenceClassifier {
    default_title: String,
}

impl KeyPresenceClassifier {
    pub fn new() -> Self {
        Self::with_default_title(DEFAULT_BRANCH_TITLE)
    }

    /// Use `title` for branch signals whose `suggested_title` is absent or blank.
    pub fn with_default_title(title: impl Into<String>) -> Self {
        Self {
            default_title: title.into(),
        }
    }

    fn decode_error(obj: &Map<String, Value>) -> Option<StreamEvent> {
        let value = obj.get("error")?;
        Some(StreamEvent::Error {
            message: value_text(value),
        })
    }

    fn decode_branch(&self, obj: &Map<String, Value>) -> Option<Result<StreamEvent, SkipReason>> {
        obj.get("start_new_chat")?;

        // The id is taken as sent, empty string included.
        let new_session_id = match obj.get("new_session_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                return Some(Err(SkipReason::InvalidField {
                    field: "new_session_id",
                    reason: "branch signal without a string session id".to_string(),
                }))
            }
        };

        let suggested_title = obj
            .get("suggested_title")
            .and_then(non_empty_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_title.clone());

        Some(Ok(StreamEvent::Branch(BranchCandidate {
            new_session_id,
            suggested_title,
        })))
    }

    fn decode_done(obj: &Map<String, Value>) -> Option<StreamEvent> {
        obj.get("done")?;
        Some(StreamEvent::Done {
            session_id: obj
                .get("session_id")
                .and_then(non_empty_str)
                .map(str::to_string),
        })
    }

    fn decode_text(obj: &Map<String, Value>) -> Option<StreamEvent> {
        let value = obj.get("text")?;
        Some(StreamEvent::TextDelta {
            text: value_text(value),
            session_id: obj
                .get("session_id")
                .and_then(non_empty_str)
                .map(str::to_string),
        })
    }
}

impl Default for KeyPresenceClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EventClassifier for KeyPresenceClassifier {
    fn classify(&self, payload: &Value) -> Classified {
        let Some(obj) = payload.as_object() else {
            return Classified::default();
        };

        let mut classified = Classified {
            error: Self::decode_error(obj),
            ..Classified::default()
        };

        match self.decode_branch(obj) {
            Some(Ok(event)) => classified.branch = Some(event),
            Some(Err(reason)) => classified.rejected.push(reason),
            None => {}
        }

        classified.done = Self::decode_done(obj);
        classified.text = Self::decode_text(obj);
        classified
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Render a field as display text: strings verbatim, `null` as empty,
/// anything else as its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
