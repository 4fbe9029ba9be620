//! Chat session state machine
//!
//! Each submission forks two independent sub-calls (answer and clause
//! suggestions). The session tracks one slot per sub-call; a submission
//! leaves the pending set once both slots have resolved, and the session
//! is idle when no submission is pending. Resolutions are applied in
//! arrival order.

use crate::core::error::DomainError;
use crate::core::query::{Clause, Query};
use crate::session::entities::Message;
use serde::{Deserialize, Serialize};

/// Assistant message appended when the answer sub-call fails
pub const FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Identifies one submission within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of one sub-call slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Pending,
    Succeeded,
    Failed,
}

impl SlotState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SlotState::Pending)
    }
}

/// How a sub-call resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Succeeded(T),
    Failed,
}

impl<T, E> From<Result<T, E>> for Resolution<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Resolution::Succeeded(value),
            Err(_) => Resolution::Failed,
        }
    }
}

/// Whether the session has any submission in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Pending,
}

/// A submission with both of its sub-call slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub query: Query,
    pub answer: SlotState,
    pub clauses: SlotState,
}

impl Submission {
    fn new(id: SubmissionId, query: Query) -> Self {
        Self {
            id,
            query,
            answer: SlotState::Pending,
            clauses: SlotState::Pending,
        }
    }

    /// Both slots have resolved
    pub fn is_resolved(&self) -> bool {
        self.answer.is_resolved() && self.clauses.is_resolved()
    }
}

/// Explanation of a clause shown alongside the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub clause: Clause,
    pub content: String,
}

/// Conversation state owned by the query orchestrator
///
/// Only the transition functions below mutate it. Messages are
/// append-only; the suggested-clause list is replaced wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<Message>,
    suggested_clauses: Vec<Clause>,
    pending: Vec<Submission>,
    explanation: Option<Explanation>,
    #[serde(skip)]
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn suggested_clauses(&self) -> &[Clause] {
        &self.suggested_clauses
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn pending(&self) -> &[Submission] {
        &self.pending
    }

    pub fn submission(&self, id: SubmissionId) -> Option<&Submission> {
        self.pending.iter().find(|s| s.id == id)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.pending.is_empty() {
            SessionPhase::Idle
        } else {
            SessionPhase::Pending
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == SessionPhase::Idle
    }

    /// Idle → Pending: record the user's message and open both slots
    ///
    /// The suggested-clause list is cleared while the new suggestions load.
    pub fn begin_submission(&mut self, query: Query) -> SubmissionId {
        self.next_id += 1;
        let id = SubmissionId(self.next_id);
        self.messages.push(Message::user(query.content()));
        self.suggested_clauses.clear();
        self.pending.push(Submission::new(id, query));
        id
    }

    /// Resolve the answer slot, appending the answer or the fallback message
    pub fn resolve_answer(
        &mut self,
        id: SubmissionId,
        resolution: Resolution<String>,
    ) -> Result<&Message, DomainError> {
        let submission = self.pending_mut(id)?;
        let message = match resolution {
            Resolution::Succeeded(answer) => {
                submission.answer = SlotState::Succeeded;
                Message::assistant(answer)
            }
            Resolution::Failed => {
                submission.answer = SlotState::Failed;
                Message::assistant(FALLBACK_MESSAGE)
            }
        };
        self.messages.push(message);
        self.retire_if_resolved(id);
        let index = self.messages.len() - 1;
        Ok(&self.messages[index])
    }

    /// Resolve the clause slot, replacing the suggestions on success
    ///
    /// On failure the list is left as it is.
    pub fn resolve_clauses(
        &mut self,
        id: SubmissionId,
        resolution: Resolution<Vec<Clause>>,
    ) -> Result<&[Clause], DomainError> {
        let submission = self.pending_mut(id)?;
        match resolution {
            Resolution::Succeeded(clauses) => {
                submission.clauses = SlotState::Succeeded;
                self.suggested_clauses = clauses;
            }
            Resolution::Failed => {
                submission.clauses = SlotState::Failed;
            }
        }
        self.retire_if_resolved(id);
        Ok(&self.suggested_clauses)
    }

    /// Record the latest clause explanation
    pub fn record_explanation(&mut self, clause: Clause, content: impl Into<String>) {
        self.explanation = Some(Explanation {
            clause,
            content: content.into(),
        });
    }

    pub fn clear_explanation(&mut self) {
        self.explanation = None;
    }

    /// Look up a suggested clause by its 1-based position
    pub fn suggested_clause(&self, position: usize) -> Option<&Clause> {
        position
            .checked_sub(1)
            .and_then(|index| self.suggested_clauses.get(index))
    }

    fn pending_mut(&mut self, id: SubmissionId) -> Result<&mut Submission, DomainError> {
        self.pending
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DomainError::UnknownSubmission(id.0))
    }

    fn retire_if_resolved(&mut self, id: SubmissionId) {
        self.pending.retain(|s| s.id != id || !s.is_resolved());
    }
}
