//! Session observer port
//!
//! Lets a front-end render a submission incrementally: each sub-call is
//! reported as soon as it resolves, in whatever order that happens.

use bca_domain::{Clause, Explanation, Message, Query, SlotState, SubmissionId};
use serde::Serialize;

/// A user-visible, toast-style notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Raised when the answer sub-call fails terminally
    pub fn answer_failed() -> Self {
        Self::new(
            "An error occurred",
            "Failed to get a response from the AI. Please check your connection and try again.",
        )
    }

    /// Raised when a clause explanation fails
    pub fn explanation_failed() -> Self {
        Self::new("Error", "Failed to get an explanation for the clause.")
    }
}

/// Final slot states of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub id: SubmissionId,
    pub answer: SlotState,
    pub clauses: SlotState,
}

/// Callbacks fired while a submission resolves
///
/// All methods default to no-ops so observers only implement what they render.
pub trait SessionObserver: Send + Sync {
    /// Called once the user message is recorded and both sub-calls are in flight
    fn on_submission_started(&self, _id: SubmissionId, _query: &Query) {}

    /// Called with the assistant message (answer or fallback)
    fn on_answer(&self, _id: SubmissionId, _message: &Message) {}

    /// Called with the current suggested-clause list once the clause slot resolves
    fn on_clauses(&self, _id: SubmissionId, _clauses: &[Clause]) {}

    /// Called after both slots have resolved
    fn on_submission_complete(&self, _report: &SubmissionReport) {}

    /// Called when starting to explain a clause
    fn on_explanation_started(&self, _clause: &Clause) {}

    /// Called with a finished clause explanation
    fn on_explanation(&self, _explanation: &Explanation) {}

    /// Raise a user-visible notification
    fn notify(&self, _notification: &Notification) {}
}

/// Observer that ignores every callback
pub struct NoSessionObserver;

impl SessionObserver for NoSessionObserver {}
