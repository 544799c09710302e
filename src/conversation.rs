// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Conversation state owned by the caller
//
// Applies each stream outcome to the locally held conversation: the
// message list, the current session id and the title. `send` takes
// `&mut self`, so at most one request per conversation can be in flight.

use serde::Serialize;

use crate::client::{ChatClient, ChatRequest};
use crate::history::{ChatMessage, HistoryError, Role};
use crate::stream::{BranchCandidate, StreamOutcome};

/// What changed as a result of one `send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub outcome: StreamOutcome,
    /// The server branched the conversation into a new session.
    pub branched: bool,
    /// The conversation's session id differs from before the send.
    pub session_changed: bool,
}

impl SendReport {
    /// Whether the caller's cached session list is now stale.
    pub fn needs_session_refresh(&self) -> bool {
        self.branched || self.session_changed
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    textbook_id: String,
    chapter_id: String,
    session_id: Option<String>,
    title: Option<String>,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// A new conversation; the server assigns the session on first reply.
    pub fn new(textbook_id: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            textbook_id: textbook_id.into(),
            chapter_id: chapter_id.into(),
            session_id: None,
            title: None,
            messages: Vec::new(),
        }
    }

    /// Resume a stored session, loading its messages from history.
    pub async fn open(
        client: &ChatClient,
        textbook_id: impl Into<String>,
        chapter_id: impl Into<String>,
        session_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, HistoryError> {
        let session_id = session_id.into();
        let messages = client.load_chat(&session_id).await?;
        Ok(Self {
            textbook_id: textbook_id.into(),
            chapter_id: chapter_id.into(),
            session_id: Some(session_id),
            title: Some(title.into()),
            messages,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` and fold the reply into this conversation.
    pub async fn send(&mut self, client: &ChatClient, text: impl Into<String>) -> SendReport {
        let text = text.into();
        self.messages.push(ChatMessage::new(Role::User, text.clone()));

        let request = ChatRequest {
            message: text,
            textbook_id: self.textbook_id.clone(),
            chapter_id: self.chapter_id.clone(),
            session_id: self.session_id.clone(),
        };

        let outcome = client.stream_message(&request).await;
        self.apply(outcome)
    }

    /// Fold one outcome into the conversation.
    pub fn apply(&mut self, outcome: StreamOutcome) -> SendReport {
        let before = self.session_id.clone();

        self.messages
            .push(ChatMessage::new(Role::Assistant, outcome.message.clone()));

        match &outcome.branch_candidate {
            Some(BranchCandidate {
                new_session_id,
                suggested_title,
            }) => {
                tracing::info!(
                    from = before.as_deref().unwrap_or(""),
                    to = %new_session_id,
                    "conversation branched"
                );
                self.session_id = Some(new_session_id.clone());
                self.title = Some(suggested_title.clone());
            }
            None => {
                if outcome.session_id.is_some() {
                    self.session_id = outcome.session_id.clone();
                }
            }
        }

        SendReport {
            branched: outcome.branch_candidate.is_some(),
            session_changed: self.session_id != before,
            outcome,
        }
    }
}
