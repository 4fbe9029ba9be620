//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Clause cannot be empty")]
    EmptyClause,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid flow input for {flow}: {reason}")]
    InvalidFlowInput { flow: String, reason: String },

    #[error("Unknown flow: {0}")]
    UnknownFlow(String),

    #[error("Unknown submission: {0}")]
    UnknownSubmission(u64),

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}
