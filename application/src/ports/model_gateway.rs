//! Model Gateway port
//!
//! Defines the interface for calling the hosted model endpoint.

use async_trait::async_trait;
use bca_domain::{FailureKind, FlowName, Model};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("503 Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    /// The endpoint failed without any message to classify
    #[error("Unclassified error")]
    Unclassified,
}

impl GatewayError {
    /// Classify the failure for the retry policy
    ///
    /// Only temporary unavailability of the endpoint is transient.
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::ServiceUnavailable(_) => FailureKind::Transient,
            _ => FailureKind::Fatal,
        }
    }
}

/// A rendered prompt plus the schema the answer must follow
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub flow: FlowName,
    pub prompt: String,
    pub output_schema: Value,
}

impl GenerationRequest {
    pub fn new(flow: FlowName, prompt: impl Into<String>, output_schema: Value) -> Self {
        Self {
            flow,
            prompt: prompt.into(),
            output_schema,
        }
    }
}

/// Gateway to the hosted model
///
/// This port defines how the application layer talks to the model endpoint.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// The model serving requests
    fn model(&self) -> &Model;

    /// Send one prompt and return the structured value the model produced
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GatewayError>;
}
