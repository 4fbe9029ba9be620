//! Chat session domain.
//!
//! - [`entities::Message`]: a single message in the conversation
//! - [`chat::ChatSession`]: conversation state owned by the orchestrator

pub mod chat;
pub mod entities;
