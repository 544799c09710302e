// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Tests for event-stream decoding
//
// Tests cover:
//  1. Literal text/done scenario produces the joined message and session
//  2. Outcome is independent of chunk boundaries (lines, UTF-8, JSON)
//  3. Text order is preserved across branch/done interleaving
//  4. A later branch overwrites an earlier one
//  5. Session adoption only fills a missing id
//  6. Error events short-circuit the stream, keeping the branch candidate
//  7. Malformed lines are skipped and reported
//  8. Unterminated final line is dropped
//  9. Transport read failures abort with StreamError
// 10. Observer receives one notification per line and per event

use super::*;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Line(String),
    Skip(&'static str),
    Event(StreamEvent),
    Finish(Termination),
}

/// An observer that records every notification in order.
#[derive(Default)]
struct RecordingObserver {
    seen: Mutex<Vec<Seen>>,
}

impl RecordingObserver {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<StreamEvent> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    fn skips(&self) -> Vec<&'static str> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Skip(label) => Some(label),
                _ => None,
            })
            .collect()
    }
}

impl StreamObserver for RecordingObserver {
    fn on_line(&self, line: &str) {
        self.seen.lock().unwrap().push(Seen::Line(line.to_string()));
    }

    fn on_skip(&self, reason: &SkipReason) {
        self.seen.lock().unwrap().push(Seen::Skip(reason.label()));
    }

    fn on_event(&self, event: &StreamEvent) {
        self.seen.lock().unwrap().push(Seen::Event(event.clone()));
    }

    fn on_finish(&self, _outcome: &StreamOutcome, termination: Termination) {
        self.seen.lock().unwrap().push(Seen::Finish(termination));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn driver_with(observer: Arc<RecordingObserver>) -> StreamDriver {
    StreamDriver::new(Arc::new(KeyPresenceClassifier::new()), observer)
}

fn driver() -> StreamDriver {
    StreamDriver::new(Arc::new(KeyPresenceClassifier::new()), Arc::new(NoopObserver))
}

/// One chunk per line, each terminated with `\n`.
fn line_stream(
    lines: Vec<&str>,
) -> impl tokio_stream::Stream<Item = Result<Bytes, std::io::Error>> + Unpin + Send {
    let chunks: Vec<Result<Bytes, std::io::Error>> = lines
        .into_iter()
        .map(|l| Ok(Bytes::from(format!("{l}\n"))))
        .collect();
    tokio_stream::iter(chunks)
}

/// Arbitrary chunking of a raw byte sequence.
fn chunked(
    data: &[u8],
    boundaries: &[usize],
) -> impl tokio_stream::Stream<Item = Result<Bytes, std::io::Error>> + Unpin + Send {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &end in boundaries {
        chunks.push(Ok(Bytes::copy_from_slice(&data[start..end])));
        start = end;
    }
    chunks.push(Ok(Bytes::copy_from_slice(&data[start..])));
    tokio_stream::iter(chunks)
}

async fn drive_lines(lines: Vec<&str>, initial: Option<&str>) -> StreamOutcome {
    driver()
        .drive(line_stream(lines), initial.map(str::to_string))
        .await
        .unwrap()
}

const MIXED_STREAM: &str = concat!(
    ": keepalive\n",
    "data: {\"text\":\"Grüß \",\"session_id\":\"S1\"}\n",
    "\n",
    "data: {\"text\":\"dich, \"}\n",
    "data: {\"start_new_chat\":true,\"new_session_id\":\"B1\",\"suggested_title\":\"Photosynthesis\"}\n",
    "data: not json\n",
    "data: {\"text\":\"日本語 ✓\",\"session_id\":\"S1\"}\n",
    "data: {\"done\":true,\"session_id\":\"S1\"}\n",
);

// ===========================================================================
// 1. Literal scenario
// ===========================================================================

#[tokio::test]
async fn literal_hello_scenario() {
    let outcome = drive_lines(
        vec![
            r#"data: {"text":"Hel","session_id":"S1"}"#,
            r#"data: {"text":"lo"}"#,
            r#"data: {"done":true,"session_id":"S1"}"#,
        ],
        None,
    )
    .await;

    assert_eq!(
        outcome,
        StreamOutcome {
            session_id: Some("S1".into()),
            branch_candidate: None,
            message: "Hello".into(),
        }
    );
}

#[tokio::test]
async fn empty_stream_keeps_caller_session() {
    let outcome = drive_lines(vec![], Some("S0")).await;
    assert_eq!(outcome.session_id.as_deref(), Some("S0"));
    assert_eq!(outcome.message, "");
    assert!(outcome.branch_candidate.is_none());
}

// ===========================================================================
// 2. Chunk-boundary independence
// ===========================================================================

#[tokio::test]
async fn every_two_way_split_matches_single_chunk() {
    let data = MIXED_STREAM.as_bytes();
    let whole = driver().drive(chunked(data, &[]), None).await.unwrap();
    assert_eq!(whole.message, "Grüß dich, 日本語 ✓");

    for split in 1..data.len() {
        let outcome = driver().drive(chunked(data, &[split]), None).await.unwrap();
        assert_eq!(outcome, whole, "split at byte {split}");
    }
}

#[tokio::test]
async fn byte_at_a_time_matches_single_chunk() {
    let data = MIXED_STREAM.as_bytes();
    let whole = driver().drive(chunked(data, &[]), None).await.unwrap();

    let boundaries: Vec<usize> = (1..data.len()).collect();
    let outcome = driver().drive(chunked(data, &boundaries), None).await.unwrap();
    assert_eq!(outcome, whole);
}

#[tokio::test]
async fn split_inside_multibyte_character_is_not_corrupted() {
    let line = "data: {\"text\":\"é\"}\n";
    let bytes = line.as_bytes();
    let pos = line.find('é').unwrap() + 1; // between the two bytes of 'é'
    let outcome = driver().drive(chunked(bytes, &[pos]), None).await.unwrap();
    assert_eq!(outcome.message, "é");
}

// ===========================================================================
// 3. Order preservation
// ===========================================================================

#[tokio::test]
async fn text_order_preserved_across_interleaving() {
    let outcome = drive_lines(
        vec![
            r#"data: {"text":"a","session_id":"S1"}"#,
            r#"data: {"done":false}"#,
            r#"data: {"text":"b"}"#,
            r#"data: {"start_new_chat":true,"new_session_id":"B1"}"#,
            "",
            r#"data: {"text":"c"}"#,
        ],
        None,
    )
    .await;
    assert_eq!(outcome.message, "abc");
}

// ===========================================================================
// 4. Branch overwrite
// ===========================================================================

#[tokio::test]
async fn second_branch_overwrites_first() {
    let outcome = drive_lines(
        vec![
            r#"data: {"start_new_chat":true,"new_session_id":"B1","suggested_title":"First"}"#,
            r#"data: {"text":"x"}"#,
            r#"data: {"start_new_chat":true,"new_session_id":"B2","suggested_title":"Second"}"#,
        ],
        Some("S0"),
    )
    .await;

    assert_eq!(outcome.session_id.as_deref(), Some("B2"));
    assert_eq!(
        outcome.branch_candidate,
        Some(BranchCandidate {
            new_session_id: "B2".into(),
            suggested_title: "Second".into(),
        })
    );
    assert!(outcome.is_branch());
}

#[tokio::test]
async fn branch_without_title_uses_placeholder() {
    let outcome = drive_lines(
        vec![r#"data: {"start_new_chat":true,"new_session_id":"B1"}"#],
        None,
    )
    .await;
    assert_eq!(
        outcome.branch_candidate.map(|b| b.suggested_title),
        Some(DEFAULT_BRANCH_TITLE.to_string())
    );
}

#[tokio::test]
async fn branch_with_empty_session_id_still_overrides() {
    let outcome = drive_lines(
        vec![r#"data: {"start_new_chat":true,"new_session_id":"","suggested_title":"T"}"#],
        Some("S0"),
    )
    .await;
    assert_eq!(
        outcome,
        StreamOutcome {
            session_id: Some(String::new()),
            branch_candidate: Some(BranchCandidate {
                new_session_id: String::new(),
                suggested_title: "T".into(),
            }),
            message: String::new(),
        }
    );
}

// ===========================================================================
// 5. Session adoption
// ===========================================================================

#[tokio::test]
async fn first_text_session_is_adopted_and_kept() {
    let outcome = drive_lines(
        vec![
            r#"data: {"text":"a","session_id":"S1"}"#,
            r#"data: {"text":"b","session_id":"S2"}"#,
        ],
        None,
    )
    .await;
    assert_eq!(outcome.session_id.as_deref(), Some("S1"));
}

#[tokio::test]
async fn caller_session_is_not_replaced_by_text() {
    let outcome = drive_lines(vec![r#"data: {"text":"a","session_id":"S1"}"#], Some("S0")).await;
    assert_eq!(outcome.session_id.as_deref(), Some("S0"));
}

// ===========================================================================
// 6. Error short-circuit
// ===========================================================================

#[tokio::test]
async fn error_stops_processing() {
    let observer = Arc::new(RecordingObserver::default());
    let outcome = driver_with(observer.clone())
        .drive(
            line_stream(vec![
                r#"data: {"text":"a","session_id":"S1"}"#,
                r#"data: {"error":"boom"}"#,
                r#"data: {"text":"b"}"#,
            ]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.message, format!("{ERROR_MESSAGE_PREFIX}boom"));
    assert_eq!(outcome.session_id.as_deref(), Some("S1"));

    let events = observer.events();
    assert_eq!(events.len(), 2);
    assert!(!events.iter().any(|e| matches!(
        e,
        StreamEvent::TextDelta { text, .. } if text == "b"
    )));
    assert_eq!(
        observer.seen().last(),
        Some(&Seen::Finish(Termination::ErrorStop))
    );
}

#[tokio::test]
async fn error_in_same_chunk_skips_remaining_lines() {
    let data = concat!(
        "data: {\"text\":\"a\"}\n",
        "data: {\"error\":\"boom\"}\n",
        "data: {\"text\":\"b\"}\n",
    );
    let observer = Arc::new(RecordingObserver::default());
    let outcome = driver_with(observer.clone())
        .drive(chunked(data.as_bytes(), &[]), None)
        .await
        .unwrap();

    assert_eq!(outcome.message, "⚠️ boom");
    let lines = observer
        .seen()
        .into_iter()
        .filter(|s| matches!(s, Seen::Line(_)))
        .count();
    assert_eq!(lines, 2);
}

#[tokio::test]
async fn error_keeps_branch_captured_before_stop() {
    let outcome = drive_lines(
        vec![
            r#"data: {"start_new_chat":true,"new_session_id":"B1","suggested_title":"Cells"}"#,
            r#"data: {"error":"quota exceeded"}"#,
        ],
        Some("S0"),
    )
    .await;

    assert_eq!(outcome.session_id.as_deref(), Some("B1"));
    assert_eq!(
        outcome.branch_candidate.as_ref().map(|b| b.suggested_title.as_str()),
        Some("Cells")
    );
    assert_eq!(outcome.message, "⚠️ quota exceeded");
}

#[tokio::test]
async fn branch_and_error_on_one_payload_both_apply() {
    let outcome = drive_lines(
        vec![r#"data: {"error":"stop","start_new_chat":true,"new_session_id":"B7","text":"t"}"#],
        None,
    )
    .await;

    assert_eq!(outcome.session_id.as_deref(), Some("B7"));
    assert!(outcome.is_branch());
    assert_eq!(outcome.message, "⚠️ stop");
}

// ===========================================================================
// 7. Malformed lines
// ===========================================================================

#[tokio::test]
async fn malformed_line_between_deltas_is_skipped() {
    let observer = Arc::new(RecordingObserver::default());
    let outcome = driver_with(observer.clone())
        .drive(
            line_stream(vec![
                r#"data: {"text":"left "}"#,
                r#"data: {"text": "unterminated"#,
                r#"data: {"text":"right"}"#,
            ]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.message, "left right");
    assert_eq!(observer.skips(), vec!["malformed"]);
}

#[tokio::test]
async fn non_data_and_blank_lines_are_ignored() {
    let observer = Arc::new(RecordingObserver::default());
    let outcome = driver_with(observer.clone())
        .drive(
            line_stream(vec![
                "event: message",
                r#"{"text":"bare json is not an event"}"#,
                "data: ",
                "",
                r#"data: {"text":"kept"}"#,
            ]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.message, "kept");
    assert_eq!(
        observer.skips(),
        vec!["not_data", "not_data", "empty_payload", "not_data"]
    );
}

// ===========================================================================
// 8. Unterminated final line
// ===========================================================================

#[tokio::test]
async fn unterminated_final_line_is_dropped() {
    let data = b"data: {\"text\":\"a\"}\ndata: {\"text\":\"b\"}";
    let outcome = driver().drive(chunked(data, &[]), None).await.unwrap();
    assert_eq!(outcome.message, "a");
}

// ===========================================================================
// 9. Transport failures
// ===========================================================================

#[tokio::test]
async fn read_failure_aborts_with_stream_error() {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Bytes, String>>(4);
    tx.send(Ok(Bytes::from_static(b"data: {\"text\":\"a\"}\n")))
        .await
        .unwrap();
    tx.send(Err("connection reset".to_string())).await.unwrap();
    drop(tx);

    let result = driver()
        .drive(ReceiverStream::new(rx), Some("S0".to_string()))
        .await;
    assert_eq!(
        result,
        Err(StreamError::Transport("connection reset".to_string()))
    );
}

#[tokio::test]
async fn chunks_are_consumed_as_they_arrive() {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Bytes, String>>(1);
    let handle = tokio::spawn(async move { driver().drive(ReceiverStream::new(rx), None).await });

    tx.send(Ok(Bytes::from_static(b"data: {\"text\":\"Hel\",\"sess")))
        .await
        .unwrap();
    tx.send(Ok(Bytes::from_static(b"ion_id\":\"S1\"}\ndata: {\"text\":\"lo\"}\n")))
        .await
        .unwrap();
    drop(tx);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.message, "Hello");
    assert_eq!(outcome.session_id.as_deref(), Some("S1"));
}

// ===========================================================================
// 10. Observer
// ===========================================================================

#[tokio::test]
async fn observer_sees_lines_events_and_finish_in_order() {
    let observer = Arc::new(RecordingObserver::default());
    driver_with(observer.clone())
        .drive(
            line_stream(vec![
                r#"data: {"text":"Hi","session_id":"S1"}"#,
                r#"data: {"done":true,"session_id":"S1"}"#,
            ]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        observer.seen(),
        vec![
            Seen::Line(r#"data: {"text":"Hi","session_id":"S1"}"#.into()),
            Seen::Event(StreamEvent::TextDelta {
                text: "Hi".into(),
                session_id: Some("S1".into()),
            }),
            Seen::Line(r#"data: {"done":true,"session_id":"S1"}"#.into()),
            Seen::Event(StreamEvent::Done {
                session_id: Some("S1".into()),
            }),
            Seen::Finish(Termination::EndOfStream),
        ]
    );
}

#[test]
fn decoder_can_be_driven_synchronously() {
    let classifier = KeyPresenceClassifier::new();
    let mut decoder = StreamDecoder::new(&classifier, &NoopObserver, None);

    assert_eq!(decoder.feed(b"data: {\"text\":\"a\",\"session_id\":\"S1\"}\n"), Flow::Continue);
    assert_eq!(decoder.session_id(), Some("S1"));
    assert_eq!(decoder.feed(b"data: {\"error\":\"x\"}\n"), Flow::Stop);
    assert_eq!(decoder.feed(b"data: {\"text\":\"b\"}\n"), Flow::Stop);

    let (outcome, termination) = decoder.finish();
    assert_eq!(termination, Termination::ErrorStop);
    assert_eq!(outcome.message, "⚠️ x");
}
