//! Invoke Flow use case
//!
//! Calls the model for one flow and retries transient failures with
//! exponential backoff. The caller sees either a decoded output or a
//! single terminal error.

use crate::config::BehaviorConfig;
use crate::ports::model_gateway::{GatewayError, GenerationRequest, ModelGateway};
use crate::ports::progress::{InvocationNotifier, NoProgress};
use bca_domain::{
    AnswerQuery, Attempt, DomainError, ExplainClause, Flow, FlowName, RetryDecision, RetryPolicy,
    SuggestClauses,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Terminal errors of a flow invocation
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The input failed validation; no attempt was made
    #[error("Invalid flow input: {0}")]
    InvalidInput(#[from] DomainError),

    /// A non-retryable failure
    #[error("{flow} failed: {source}")]
    Fatal {
        flow: FlowName,
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    /// Transient failures persisted through every attempt
    #[error("{flow} failed after multiple retries")]
    Exhausted {
        flow: FlowName,
        attempts: u32,
        last_error: GatewayError,
    },
}

impl InvokeError {
    /// Number of attempts made before the error was raised
    pub fn attempts(&self) -> u32 {
        match self {
            InvokeError::InvalidInput(_) => 0,
            InvokeError::Fatal { attempts, .. } | InvokeError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, InvokeError::Exhausted { .. })
    }
}

/// Retrying wrapper around a [`ModelGateway`]
pub struct FlowInvoker<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    notifier: Arc<dyn InvocationNotifier>,
}

impl<G: ModelGateway + 'static> FlowInvoker<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            policy: RetryPolicy::default(),
            timeout: None,
            notifier: Arc::new(NoProgress),
        }
    }

    /// Apply timeout and retry settings
    pub fn with_behavior(mut self, behavior: &BehaviorConfig) -> Self {
        self.policy = behavior.retry;
        self.timeout = behavior.timeout;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn InvocationNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Run a typed flow
    pub async fn invoke<F: Flow>(&self, input: &F::Input) -> Result<F::Output, InvokeError> {
        F::validate(input)?;
        let request = GenerationRequest::new(F::NAME, F::render_prompt(input), F::output_schema());
        self.execute(&request).await
    }

    /// Run a flow identified by name with an untyped input
    ///
    /// The input is decoded into the flow's input type and validated before
    /// any attempt is made. The output is returned as JSON.
    pub async fn invoke_named(&self, flow: FlowName, input: Value) -> Result<Value, InvokeError> {
        match flow {
            FlowName::AnswerQuery => self.invoke_value::<AnswerQuery>(input).await,
            FlowName::SuggestClauses => self.invoke_value::<SuggestClauses>(input).await,
            FlowName::ExplainClause => self.invoke_value::<ExplainClause>(input).await,
        }
    }

    async fn invoke_value<F: Flow>(&self, input: Value) -> Result<Value, InvokeError> {
        let input: F::Input =
            serde_json::from_value(input).map_err(|e| DomainError::InvalidFlowInput {
                flow: F::NAME.to_string(),
                reason: e.to_string(),
            })?;
        let output = self.invoke::<F>(&input).await?;
        serde_json::to_value(output).map_err(|e| InvokeError::Fatal {
            flow: F::NAME,
            attempts: 1,
            source: GatewayError::InvalidResponse(e.to_string()),
        })
    }

    /// Attempt the request until it succeeds, fails fatally, or runs out of attempts
    async fn execute<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> Result<T, InvokeError> {
        let flow = request.flow;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!("{} attempt {}/{}", flow, attempt, self.policy.max_attempts());

            let error = match self.attempt_once::<T>(request).await {
                Ok(output) => {
                    if attempt > 1 {
                        info!("{} succeeded on attempt {}", flow, attempt);
                    }
                    self.notifier.on_attempt(flow, &Attempt::succeeded(attempt));
                    return Ok(output);
                }
                Err(error) => error,
            };

            let kind = error.kind();
            match self.policy.decide(attempt, kind) {
                RetryDecision::Retry { after } => {
                    warn!(
                        "{} attempt {} failed with a transient error, retrying in {:?}: {}",
                        flow, attempt, after, error
                    );
                    self.notifier.on_attempt(
                        flow,
                        &Attempt::failed(attempt, kind, error.to_string()).with_backoff(after),
                    );
                    tokio::time::sleep(after).await;
                }
                RetryDecision::Fail => {
                    warn!("{} attempt {} failed: {}", flow, attempt, error);
                    self.notifier
                        .on_attempt(flow, &Attempt::failed(attempt, kind, error.to_string()));
                    return Err(InvokeError::Fatal {
                        flow,
                        attempts: attempt,
                        source: error,
                    });
                }
                RetryDecision::Exhausted => {
                    warn!("{} failed after {} attempts: {}", flow, attempt, error);
                    self.notifier
                        .on_attempt(flow, &Attempt::failed(attempt, kind, error.to_string()));
                    return Err(InvokeError::Exhausted {
                        flow,
                        attempts: attempt,
                        last_error: error,
                    });
                }
            }
        }
    }

    /// One call to the gateway, decoded into the expected output
    async fn attempt_once<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> Result<T, GatewayError> {
        let call = self.gateway.generate(request);
        let value = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)??,
            None => call.await?,
        };
        serde_json::from_value(value).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}
