//! Interactive chat module
//!
//! Provides a line-editor based chat interface over the query orchestrator.

mod command;
mod repl;

pub use command::{ExplainTarget, ReplCommand};
pub use repl::ChatRepl;
