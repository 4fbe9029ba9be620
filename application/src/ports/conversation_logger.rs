//! Conversation transcript port
//!
//! Every user query, answer, clause list and explanation (and every
//! failure among them) is handed to a [`ConversationLogger`] as a
//! [`ConversationEvent`]. Diagnostics stay in `tracing`; this port carries
//! the machine-readable transcript.

use serde_json::Value;

/// What happened in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    UserQuery,
    Answer,
    AnswerFailed,
    Clauses,
    ClausesFailed,
    Explanation,
    ExplanationFailed,
}

impl EventKind {
    /// Stable identifier written to the transcript
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserQuery => "user_query",
            EventKind::Answer => "answer",
            EventKind::AnswerFailed => "answer_failed",
            EventKind::Clauses => "clauses",
            EventKind::ClausesFailed => "clauses_failed",
            EventKind::Explanation => "explanation",
            EventKind::ExplanationFailed => "explanation_failed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    pub kind: EventKind,
    /// Event-specific fields (submission id, text, clauses, error)
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for transcript entries
///
/// Implementations must not fail the caller; write errors are dropped.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logger used when no transcript is configured
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
