// Copyright 2026 The Branchline Project
// SPDX-License-Identifier: Apache-2.0

// Session reconciler
//
// Tracks which session the response belongs to. A text delta can only
// fill in a missing id; a branch always replaces it.

use super::types::BranchCandidate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReconciler {
    session_id: Option<String>,
    branch: Option<BranchCandidate>,
}

impl SessionReconciler {
    /// Start from the caller's session. An empty id counts as no session.
    pub fn new(initial: Option<String>) -> Self {
        Self {
            session_id: initial.filter(|id| !id.is_empty()),
            branch: None,
        }
    }

    /// Adopt `session_id` if no session is held yet.
    ///
    /// Returns true when the id was adopted. A differing id after one is
    /// already held is ignored: only a branch moves the session.
    pub fn observe_text(&mut self, session_id: Option<&str>) -> bool {
        match (self.session_id.is_none(), session_id) {
            (true, Some(id)) if !id.is_empty() => {
                self.session_id = Some(id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Move to the candidate's session and keep it as the current branch.
    ///
    /// A later branch in the same stream replaces an earlier one.
    pub fn observe_branch(&mut self, candidate: BranchCandidate) {
        self.session_id = Some(candidate.new_session_id.clone());
        self.branch = Some(candidate);
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn branch_candidate(&self) -> Option<&BranchCandidate> {
        self.branch.as_ref()
    }

    pub fn result(self) -> (Option<String>, Option<BranchCandidate>) {
        (self.session_id, self.branch)
    }
}
