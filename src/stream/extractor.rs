// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Event extractor
//
// Filters lines down to `data: ` payloads and parses them as JSON.

use super::types::{SkipReason, DATA_PREFIX};

/// Result of inspecting one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Payload(serde_json::Value),
    Skip(SkipReason),
}

/// Extract the JSON payload carried by a single line.
///
/// ```text
/// data: {"text":"Hi"}\n   -> Payload
/// event: message\n        -> Skip(NotData)
/// data:   \n              -> Skip(EmptyPayload)
/// data: {oops\n           -> Skip(Malformed)
/// ```
///
/// The marker must be the literal six characters `data: ` at the very
/// start of the line; the remainder is trimmed before parsing.
pub fn extract(line: &str) -> Extracted {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Extracted::Skip(SkipReason::NotData);
    };

    let payload = rest.trim();
    if payload.is_empty() {
        return Extracted::Skip(SkipReason::EmptyPayload);
    }

    match serde_json::from_str(payload) {
        Ok(value) => Extracted::Payload(value),
        Err(e) => Extracted::Skip(SkipReason::Malformed {
            error: e.to_string(),
            payload: payload.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_data_line() {
        assert_eq!(
            extract(r#"data: {"text":"Hi","session_id":"S1"}"#),
            Extracted::Payload(json!({"text": "Hi", "session_id": "S1"}))
        );
    }

    #[test]
    fn trims_payload_whitespace() {
        assert_eq!(
            extract("data:   {\"done\":true}  \r"),
            Extracted::Payload(json!({"done": true}))
        );
    }

    #[test]
    fn skips_lines_without_marker() {
        assert_eq!(extract(""), Extracted::Skip(SkipReason::NotData));
        assert_eq!(extract("event: delta"), Extracted::Skip(SkipReason::NotData));
        assert_eq!(extract(": keepalive"), Extracted::Skip(SkipReason::NotData));
        // Marker without the trailing space is not the literal prefix.
        assert_eq!(extract("data:{\"text\":\"x\"}"), Extracted::Skip(SkipReason::NotData));
        assert_eq!(extract(" data: {}"), Extracted::Skip(SkipReason::NotData));
    }

    #[test]
    fn skips_blank_payload() {
        assert_eq!(extract("data: "), Extracted::Skip(SkipReason::EmptyPayload));
        assert_eq!(extract("data:    \t"), Extracted::Skip(SkipReason::EmptyPayload));
    }

    #[test]
    fn reports_malformed_json() {
        match extract("data: {\"text\": ") {
            Extracted::Skip(SkipReason::Malformed { payload, error }) => {
                assert_eq!(payload, "{\"text\":");
                assert!(!error.is_empty());
            }
            other => panic!("expected malformed skip, got {other:?}"),
        }
    }
}
