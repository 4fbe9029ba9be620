//! Application layer for bca-assist
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, EventKind, NoConversationLogger},
    model_gateway::{GatewayError, GenerationRequest, ModelGateway},
    progress::{InvocationNotifier, NoProgress},
    session_observer::{NoSessionObserver, Notification, SessionObserver, SubmissionReport},
};
pub use use_cases::flows::CodeAssistFlows;
pub use use_cases::invoke_flow::{FlowInvoker, InvokeError};
pub use use_cases::submit_query::{ExplainError, QueryOrchestrator, SubmitError};
