//! Adapter for the hosted Gemini model

pub mod gateway;
pub mod types;

pub use gateway::GeminiGateway;
