//! Attempt records and failure classification

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classification of a failed model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The endpoint is temporarily unavailable; eligible for retry
    Transient,
    /// Anything else; never retried
    Fatal,
}

/// Outcome of a single attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    TransientFailure { error: String },
    FatalFailure { error: String },
}

impl AttemptOutcome {
    /// Build a failure outcome from a classified error message
    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        match kind {
            FailureKind::Transient => AttemptOutcome::TransientFailure {
                error: error.into(),
            },
            FailureKind::Fatal => AttemptOutcome::FatalFailure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// Ephemeral record of one invocation try
///
/// `ordinal` starts at 1. `backoff` is the delay waited before the next
/// attempt, and is `None` when no further attempt follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub ordinal: u32,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<Duration>,
}

impl Attempt {
    pub fn succeeded(ordinal: u32) -> Self {
        Self {
            ordinal,
            outcome: AttemptOutcome::Success,
            backoff: None,
        }
    }

    pub fn failed(ordinal: u32, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            ordinal,
            outcome: AttemptOutcome::failure(kind, error),
            backoff: None,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = Some(backoff);
        self
    }
}
