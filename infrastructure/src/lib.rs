//! Infrastructure layer for bca-assist
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Gemini model gateway, configuration
//! file loading and the JSONL conversation transcript.

pub mod config;
pub mod gemini;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBehaviorConfig, FileConfig, FileLoggingConfig,
    FileModelConfig, FileOutputConfig, FileOutputFormat, FileReplConfig, FileRetryConfig,
};
pub use gemini::GeminiGateway;
pub use logging::JsonlConversationLogger;
