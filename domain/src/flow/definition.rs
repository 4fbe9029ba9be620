//! The flow trait

use crate::core::error::DomainError;
use crate::flow::name::FlowName;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named, schema-typed operation against the model
///
/// Implementations are pure: they validate input, render a prompt and
/// describe the expected output. They never call the model themselves.
pub trait Flow: Send + Sync + 'static {
    /// Structured input accepted by the flow
    type Input: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Structured output the model must return
    type Output: DeserializeOwned + Serialize + Send + 'static;

    /// Name of the remote prompt/schema pair
    const NAME: FlowName;

    /// Check the input before any invocation is attempted
    fn validate(_input: &Self::Input) -> Result<(), DomainError> {
        Ok(())
    }

    /// Render the natural-language prompt for the input
    fn render_prompt(input: &Self::Input) -> String;

    /// Schema the model output must conform to
    fn output_schema() -> Value;
}

/// Build the error returned when a flow input fails validation
pub(crate) fn invalid_input(flow: FlowName, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidFlowInput {
        flow: flow.to_string(),
        reason: reason.into(),
    }
}
