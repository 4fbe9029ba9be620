//! Flow definitions.
//!
//! A flow is a named, schema-typed operation: it validates a structured
//! input, renders a prompt from it, and declares the shape of the output
//! the model must return. Flows hold no state and never retry on their
//! own; execution and retries belong to the application layer.
//!
//! - [`definition::Flow`]: the trait every flow implements
//! - [`definitions`]: answer query, suggest clauses, explain clause
//! - [`schema`]: output schema builders

pub mod definition;
pub mod definitions;
pub mod name;
pub mod schema;

pub use definition::Flow;
pub use definitions::{
    AnswerQuery, AnswerQueryInput, AnswerQueryOutput, ExplainClause, ExplainClauseInput,
    ExplainClauseOutput, SuggestClauses, SuggestClausesInput, SuggestClausesOutput,
};
pub use name::FlowName;
