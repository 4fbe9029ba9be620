//! Domain layer for bca-assist
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Flows
//!
//! A flow pairs a structured input, a prompt template and an output schema.
//! Three flows exist: answer a query, suggest related clauses, and explain
//! a clause.
//!
//! ## Invocation
//!
//! Each flow call is attempted under a [`RetryPolicy`]: transient failures
//! are retried with exponential backoff, fatal failures are reported at once.
//!
//! ## Chat session
//!
//! [`ChatSession`] holds the conversation and the suggested clauses, and
//! tracks the two independent sub-calls of every submission.

pub mod config;
pub mod core;
pub mod flow;
pub mod invocation;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    model::Model,
    query::{Clause, Query},
};
pub use flow::{
    AnswerQuery, AnswerQueryInput, AnswerQueryOutput, ExplainClause, ExplainClauseInput,
    ExplainClauseOutput, Flow, FlowName, SuggestClauses, SuggestClausesInput,
    SuggestClausesOutput,
};
pub use invocation::{
    attempt::{Attempt, AttemptOutcome, FailureKind},
    policy::{RetryDecision, RetryPolicy},
};
pub use prompt::PromptTemplate;
pub use session::{
    chat::{
        ChatSession, Explanation, FALLBACK_MESSAGE, Resolution, SessionPhase, SlotState,
        Submission, SubmissionId,
    },
    entities::{Message, Role},
};
