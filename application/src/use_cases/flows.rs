//! Flow invocation surface
//!
//! The three named operations consumed by front-ends. Each is plain glue
//! over [`FlowInvoker`]; retries happen there and nowhere else.

use crate::ports::model_gateway::ModelGateway;
use crate::use_cases::invoke_flow::{FlowInvoker, InvokeError};
use bca_domain::{
    AnswerQuery, AnswerQueryInput, AnswerQueryOutput, ExplainClause, ExplainClauseInput,
    ExplainClauseOutput, SuggestClauses, SuggestClausesInput, SuggestClausesOutput,
};
use std::sync::Arc;

/// Typed entry points for the building-code flows
pub struct CodeAssistFlows<G: ModelGateway + 'static> {
    invoker: Arc<FlowInvoker<G>>,
}

impl<G: ModelGateway + 'static> Clone for CodeAssistFlows<G> {
    fn clone(&self) -> Self {
        Self {
            invoker: Arc::clone(&self.invoker),
        }
    }
}

impl<G: ModelGateway + 'static> CodeAssistFlows<G> {
    pub fn new(invoker: FlowInvoker<G>) -> Self {
        Self {
            invoker: Arc::new(invoker),
        }
    }

    pub fn invoker(&self) -> &FlowInvoker<G> {
        &self.invoker
    }

    /// Answer a question about the building code
    pub async fn answer_query(
        &self,
        input: &AnswerQueryInput,
    ) -> Result<AnswerQueryOutput, InvokeError> {
        self.invoker.invoke::<AnswerQuery>(input).await
    }

    /// Suggest clauses related to a question
    pub async fn suggest_relevant_clauses(
        &self,
        input: &SuggestClausesInput,
    ) -> Result<SuggestClausesOutput, InvokeError> {
        self.invoker.invoke::<SuggestClauses>(input).await
    }

    /// Explain a single clause
    pub async fn explain_code_clause(
        &self,
        input: &ExplainClauseInput,
    ) -> Result<ExplainClauseOutput, InvokeError> {
        self.invoker.invoke::<ExplainClause>(input).await
    }
}
