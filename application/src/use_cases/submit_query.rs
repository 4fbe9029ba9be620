//! Submit Query use case
//!
//! Orchestrates one user submission: the answer and clause-suggestion
//! flows run as two independent tasks, and each result is applied to the
//! chat session as soon as it arrives. Neither sub-call can fail the other.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, EventKind, NoConversationLogger,
};
use crate::ports::model_gateway::ModelGateway;
use crate::ports::session_observer::{Notification, SessionObserver, SubmissionReport};
use crate::use_cases::flows::CodeAssistFlows;
use crate::use_cases::invoke_flow::InvokeError;
use bca_domain::{
    AnswerQueryInput, AnswerQueryOutput, ChatSession, Clause, ExplainClauseInput, Explanation,
    Query, Resolution, SlotState, SubmissionId, SuggestClausesInput, SuggestClausesOutput,
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Errors returned by [`QueryOrchestrator::submit`]
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Message cannot be empty.")]
    EmptyQuery,
}

/// Errors returned by [`QueryOrchestrator::explain`]
#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("Clause cannot be empty.")]
    EmptyClause,

    #[error("Failed to explain clause: {0}")]
    Flow(#[from] InvokeError),
}

/// Result of one sub-call, tagged by slot
enum SubCall {
    Answer(Result<AnswerQueryOutput, InvokeError>),
    Clauses(Result<SuggestClausesOutput, InvokeError>),
}

/// Owns the chat session and drives submissions against it
pub struct QueryOrchestrator<G: ModelGateway + 'static> {
    flows: CodeAssistFlows<G>,
    session: Mutex<ChatSession>,
    logger: Arc<dyn ConversationLogger>,
}

impl<G: ModelGateway + 'static> QueryOrchestrator<G> {
    pub fn new(flows: CodeAssistFlows<G>) -> Self {
        Self {
            flows,
            session: Mutex::new(ChatSession::new()),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn flows(&self) -> &CodeAssistFlows<G> {
        &self.flows
    }

    /// A copy of the current session state
    pub fn snapshot(&self) -> ChatSession {
        self.session().clone()
    }

    /// Look up a suggested clause by its 1-based position in the current list
    pub fn suggested_clause(&self, position: usize) -> Option<Clause> {
        self.session().suggested_clause(position).cloned()
    }

    /// Close the explanation currently shown, if any
    pub fn dismiss_explanation(&self) {
        self.session().clear_explanation();
    }

    /// Submit a query: answer it and suggest related clauses concurrently
    ///
    /// Empty queries are rejected before any flow runs. Otherwise this
    /// returns once both sub-calls have resolved; failures are absorbed
    /// into the session and reported through `observer`.
    pub async fn submit(
        &self,
        raw: &str,
        observer: &dyn SessionObserver,
    ) -> Result<SubmissionReport, SubmitError> {
        let query = Query::new(raw).map_err(|_| SubmitError::EmptyQuery)?;

        let id = self.session().begin_submission(query.clone());
        info!("Submission {} started", id);
        self.logger.log(ConversationEvent::new(
            EventKind::UserQuery,
            json!({ "submission": id.value(), "query": query.content() }),
        ));
        observer.on_submission_started(id, &query);

        let mut join_set = JoinSet::new();

        let flows = self.flows.clone();
        let answer_input = AnswerQueryInput::new(&query);
        join_set.spawn(async move { SubCall::Answer(flows.answer_query(&answer_input).await) });

        let flows = self.flows.clone();
        let clauses_input = SuggestClausesInput::new(&query);
        join_set.spawn(async move {
            SubCall::Clauses(flows.suggest_relevant_clauses(&clauses_input).await)
        });

        let mut answer = SlotState::Pending;
        let mut clauses = SlotState::Pending;

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(SubCall::Answer(outcome)) => {
                    answer = self.apply_answer(id, outcome.map_err(|e| e.to_string()), observer);
                }
                Ok(SubCall::Clauses(outcome)) => {
                    clauses =
                        self.apply_clauses(id, outcome.map_err(|e| e.to_string()), observer);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        // A sub-call task that panicked still has to resolve its slot
        if !answer.is_resolved() {
            answer = self.apply_answer(id, Err("answer task aborted".to_string()), observer);
        }
        if !clauses.is_resolved() {
            clauses = self.apply_clauses(id, Err("clause task aborted".to_string()), observer);
        }

        let report = SubmissionReport {
            id,
            answer,
            clauses,
        };
        info!(
            "Submission {} complete (answer: {:?}, clauses: {:?})",
            id, answer, clauses
        );
        observer.on_submission_complete(&report);
        Ok(report)
    }

    /// Explain a clause and record the explanation on the session
    ///
    /// A failure raises a notification and leaves the conversation unchanged.
    pub async fn explain(
        &self,
        raw_clause: &str,
        observer: &dyn SessionObserver,
    ) -> Result<Explanation, ExplainError> {
        let clause = Clause::new(raw_clause).map_err(|_| ExplainError::EmptyClause)?;
        observer.on_explanation_started(&clause);

        match self
            .flows
            .explain_code_clause(&ExplainClauseInput::new(&clause))
            .await
        {
            Ok(output) => {
                let explanation = Explanation {
                    clause: clause.clone(),
                    content: output.explanation,
                };
                self.session()
                    .record_explanation(clause, explanation.content.clone());
                self.logger.log(ConversationEvent::new(
                    EventKind::Explanation,
                    json!({ "clause": explanation.clause.as_str(), "text": explanation.content }),
                ));
                observer.on_explanation(&explanation);
                Ok(explanation)
            }
            Err(e) => {
                error!("Error explaining clause {}: {}", clause, e);
                self.logger.log(ConversationEvent::new(
                    EventKind::ExplanationFailed,
                    json!({ "clause": clause.as_str(), "error": e.to_string() }),
                ));
                observer.notify(&Notification::explanation_failed());
                Err(ExplainError::Flow(e))
            }
        }
    }

    /// Primary slot: a failure becomes a fallback message plus a notification
    fn apply_answer(
        &self,
        id: SubmissionId,
        outcome: Result<AnswerQueryOutput, String>,
        observer: &dyn SessionObserver,
    ) -> SlotState {
        let (resolution, state) = match outcome {
            Ok(output) => {
                self.logger.log(ConversationEvent::new(
                    EventKind::Answer,
                    json!({ "submission": id.value(), "text": output.answer }),
                ));
                (Resolution::Succeeded(output.answer), SlotState::Succeeded)
            }
            Err(reason) => {
                error!("Error processing query {}: {}", id, reason);
                self.logger.log(ConversationEvent::new(
                    EventKind::AnswerFailed,
                    json!({ "submission": id.value(), "error": reason }),
                ));
                (Resolution::Failed, SlotState::Failed)
            }
        };

        let message = match self.session().resolve_answer(id, resolution) {
            Ok(message) => message.clone(),
            Err(e) => {
                warn!("Dropping answer for {}: {}", id, e);
                return state;
            }
        };
        observer.on_answer(id, &message);
        if state == SlotState::Failed {
            observer.notify(&Notification::answer_failed());
        }
        state
    }

    /// Secondary slot: a failure is logged only
    fn apply_clauses(
        &self,
        id: SubmissionId,
        outcome: Result<SuggestClausesOutput, String>,
        observer: &dyn SessionObserver,
    ) -> SlotState {
        let (resolution, state) = match outcome {
            Ok(output) => {
                let clauses = output.into_clauses();
                self.logger.log(ConversationEvent::new(
                    EventKind::Clauses,
                    json!({ "submission": id.value(), "clauses": clauses }),
                ));
                (Resolution::Succeeded(clauses), SlotState::Succeeded)
            }
            Err(reason) => {
                warn!("Could not fetch suggested clauses for {}: {}", id, reason);
                self.logger.log(ConversationEvent::new(
                    EventKind::ClausesFailed,
                    json!({ "submission": id.value(), "error": reason }),
                ));
                (Resolution::Failed, SlotState::Failed)
            }
        };

        let current = match self.session().resolve_clauses(id, resolution) {
            Ok(clauses) => clauses.to_vec(),
            Err(e) => {
                warn!("Dropping clause suggestions for {}: {}", id, e);
                return state;
            }
        };
        observer.on_clauses(id, &current);
        state
    }

    fn session(&self) -> MutexGuard<'_, ChatSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_gateway::{GatewayError, GenerationRequest};
    use crate::ports::session_observer::NoSessionObserver;
    use crate::use_cases::invoke_flow::FlowInvoker;
    use async_trait::async_trait;
    use bca_domain::{FALLBACK_MESSAGE, FlowName, Message, Model, Role};
    use serde_json::Value;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    // ==================== Test Mocks ====================

    type Scripted = (Duration, Result<Value, GatewayError>);

    #[derive(Default)]
    struct ScriptedGateway {
        model: Model,
        scripts: Mutex<HashMap<FlowName, VecDeque<Scripted>>>,
        calls: Mutex<Vec<FlowName>>,
    }

    impl ScriptedGateway {
        fn respond(self, flow: FlowName, delay_ms: u64, result: Result<Value, GatewayError>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .entry(flow)
                .or_default()
                .push_back((Duration::from_millis(delay_ms), result));
            self
        }

        fn calls(&self) -> Vec<FlowName> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value, GatewayError> {
            self.calls.lock().unwrap().push(request.flow);
            let scripted = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&request.flow)
                .and_then(|queue| queue.pop_front());
            match scripted {
                Some((delay, result)) => {
                    tokio::time::sleep(delay).await;
                    result
                }
                None => Err(GatewayError::Unclassified),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
        notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn notifications(&self) -> Vec<Notification> {
            self.notifications.lock().unwrap().clone()
        }
    }

    impl SessionObserver for RecordingObserver {
        fn on_submission_started(&self, _id: SubmissionId, query: &Query) {
            self.events.lock().unwrap().push(format!("started:{}", query));
        }

        fn on_answer(&self, _id: SubmissionId, message: &Message) {
            self.events
                .lock()
                .unwrap()
                .push(format!("answer:{}", message.content));
        }

        fn on_clauses(&self, _id: SubmissionId, clauses: &[Clause]) {
            self.events
                .lock()
                .unwrap()
                .push(format!("clauses:{}", clauses.len()));
        }

        fn on_submission_complete(&self, _report: &SubmissionReport) {
            self.events.lock().unwrap().push("complete".to_string());
        }

        fn on_explanation(&self, explanation: &Explanation) {
            self.events
                .lock()
                .unwrap()
                .push(format!("explanation:{}", explanation.clause));
        }

        fn notify(&self, notification: &Notification) {
            self.notifications
                .lock()
                .unwrap()
                .push(notification.clone());
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.kind.as_str());
        }
    }

    fn answer(text: &str) -> Result<Value, GatewayError> {
        Ok(json!({ "answer": text }))
    }

    fn clauses(refs: &[&str]) -> Result<Value, GatewayError> {
        Ok(json!({ "clauses": refs }))
    }

    fn bad_request() -> Result<Value, GatewayError> {
        Err(GatewayError::RequestFailed {
            status: 400,
            message: "Invalid argument".to_string(),
        })
    }

    fn orchestrator(gateway: ScriptedGateway) -> (QueryOrchestrator<ScriptedGateway>, Arc<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        let flows = CodeAssistFlows::new(FlowInvoker::new(Arc::clone(&gateway)));
        (QueryOrchestrator::new(flows), gateway)
    }

    // ==================== Submit ====================

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_rejected_before_any_flow() {
        let (orchestrator, gateway) = orchestrator(ScriptedGateway::default());

        for raw in ["", "   ", "\n"] {
            let result = orchestrator.submit(raw, &NoSessionObserver).await;
            assert!(matches!(result, Err(SubmitError::EmptyQuery)));
        }

        assert!(gateway.calls().is_empty());
        assert!(orchestrator.snapshot().messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_sub_calls_succeed() {
        let (orchestrator, gateway) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 0, answer("2.4 m for habitable rooms."))
                .respond(FlowName::SuggestClauses, 0, clauses(&["H4D3", "H4D2"])),
        );
        let observer = RecordingObserver::default();

        let report = orchestrator
            .submit("Minimum ceiling height?", &observer)
            .await
            .unwrap();

        assert_eq!(report.answer, SlotState::Succeeded);
        assert_eq!(report.clauses, SlotState::Succeeded);
        let session = orchestrator.snapshot();
        assert!(session.is_idle());
        assert_eq!(
            session.messages(),
            &[
                Message::user("Minimum ceiling height?"),
                Message::assistant("2.4 m for habitable rooms."),
            ]
        );
        assert_eq!(session.suggested_clauses().len(), 2);
        assert!(observer.notifications().is_empty());
        let mut calls = gateway.calls();
        calls.sort_by_key(|flow| flow.as_str());
        assert_eq!(calls, vec![FlowName::AnswerQuery, FlowName::SuggestClauses]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_failure_keeps_clauses_and_notifies() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 0, bad_request())
                .respond(FlowName::SuggestClauses, 0, clauses(&["D2D13"])),
        );
        let observer = RecordingObserver::default();

        let report = orchestrator.submit("Stair riser?", &observer).await.unwrap();

        assert_eq!(report.answer, SlotState::Failed);
        assert_eq!(report.clauses, SlotState::Succeeded);
        let session = orchestrator.snapshot();
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, FALLBACK_MESSAGE);
        assert_eq!(session.suggested_clauses(), &[Clause::new("D2D13").unwrap()]);
        assert_eq!(observer.notifications(), vec![Notification::answer_failed()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clause_failure_is_silent() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 0, answer("Use a 1 m balustrade."))
                .respond(FlowName::SuggestClauses, 0, bad_request()),
        );
        let observer = RecordingObserver::default();

        let report = orchestrator
            .submit("Balustrade height?", &observer)
            .await
            .unwrap();

        assert_eq!(report.answer, SlotState::Succeeded);
        assert_eq!(report.clauses, SlotState::Failed);
        let session = orchestrator.snapshot();
        assert_eq!(
            session.messages().last().unwrap(),
            &Message::assistant("Use a 1 m balustrade.")
        );
        assert!(session.suggested_clauses().is_empty());
        assert!(observer.notifications().is_empty());
        assert!(observer.events().contains(&"clauses:0".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_applied_in_arrival_order() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 500, answer("slow answer"))
                .respond(FlowName::SuggestClauses, 10, clauses(&["A"])),
        );
        let observer = RecordingObserver::default();

        orchestrator.submit("q", &observer).await.unwrap();

        assert_eq!(
            observer.events(),
            vec!["started:q", "clauses:1", "answer:slow answer", "complete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_first_when_clauses_are_slow() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 10, answer("fast answer"))
                .respond(FlowName::SuggestClauses, 500, clauses(&["A", "B"])),
        );
        let observer = RecordingObserver::default();

        orchestrator.submit("q", &observer).await.unwrap();

        assert_eq!(
            observer.events(),
            vec!["started:q", "answer:fast answer", "clauses:2", "complete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_retry_does_not_block_clauses() {
        let (orchestrator, gateway) = orchestrator(
            ScriptedGateway::default()
                .respond(
                    FlowName::AnswerQuery,
                    0,
                    Err(GatewayError::ServiceUnavailable("overloaded".to_string())),
                )
                .respond(FlowName::AnswerQuery, 0, answer("after retry"))
                .respond(FlowName::SuggestClauses, 0, clauses(&["A"])),
        );
        let observer = RecordingObserver::default();

        let report = orchestrator.submit("q", &observer).await.unwrap();

        assert_eq!(report.answer, SlotState::Succeeded);
        assert_eq!(
            observer.events(),
            vec!["started:q", "clauses:1", "answer:after retry", "complete"]
        );
        assert_eq!(gateway.calls().len(), 3);
    }

    /// Answers slowly for the query "one" and quickly for anything else
    struct ByQueryGateway {
        model: Model,
    }

    #[async_trait]
    impl ModelGateway for ByQueryGateway {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value, GatewayError> {
            let slow = request.prompt.ends_with("User Query: one");
            let (delay, label) = if slow { (300, "one") } else { (100, "two") };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match request.flow {
                FlowName::SuggestClauses => clauses(&[label]),
                _ => answer(label),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submissions_both_resolve() {
        let gateway = Arc::new(ByQueryGateway {
            model: Model::default(),
        });
        let orchestrator =
            QueryOrchestrator::new(CodeAssistFlows::new(FlowInvoker::new(gateway)));
        let observer = RecordingObserver::default();

        let (first, second) = tokio::join!(
            orchestrator.submit("one", &observer),
            orchestrator.submit("two", &observer),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        let session = orchestrator.snapshot();
        assert!(session.is_idle());
        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "two", "one"]);
        // The slower submission resolves last and its clauses win
        assert_eq!(session.suggested_clauses(), &[Clause::new("one").unwrap()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_conversation_events_logged() {
        let logger = Arc::new(RecordingLogger::default());
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 10, answer("a"))
                .respond(FlowName::SuggestClauses, 20, bad_request()),
        );
        let orchestrator = orchestrator.with_logger(logger.clone());

        orchestrator.submit("q", &NoSessionObserver).await.unwrap();

        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["user_query", "answer", "clauses_failed"]
        );
    }

    // ==================== Explain ====================

    #[tokio::test(start_paused = true)]
    async fn test_explain_records_explanation() {
        let (orchestrator, _) = orchestrator(ScriptedGateway::default().respond(
            FlowName::ExplainClause,
            0,
            Ok(json!({ "explanation": "Wet areas must be waterproofed." })),
        ));
        let observer = RecordingObserver::default();

        let explanation = orchestrator.explain("H2D2", &observer).await.unwrap();

        assert_eq!(explanation.content, "Wet areas must be waterproofed.");
        let session = orchestrator.snapshot();
        assert_eq!(session.explanation(), Some(&explanation));
        assert!(session.messages().is_empty());
        assert_eq!(observer.events(), vec!["explanation:H2D2"]);

        orchestrator.dismiss_explanation();
        assert!(orchestrator.snapshot().explanation().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explain_failure_notifies_once() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default().respond(FlowName::ExplainClause, 0, bad_request()),
        );
        let observer = RecordingObserver::default();

        let result = orchestrator.explain("H2D2", &observer).await;

        assert!(matches!(result, Err(ExplainError::Flow(_))));
        assert_eq!(
            observer.notifications(),
            vec![Notification::explanation_failed()]
        );
        let session = orchestrator.snapshot();
        assert!(session.explanation().is_none());
        assert!(session.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explain_empty_clause_rejected() {
        let (orchestrator, gateway) = orchestrator(ScriptedGateway::default());

        let result = orchestrator.explain("  ", &NoSessionObserver).await;

        assert!(matches!(result, Err(ExplainError::EmptyClause)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggested_clause_lookup() {
        let (orchestrator, _) = orchestrator(
            ScriptedGateway::default()
                .respond(FlowName::AnswerQuery, 0, answer("a"))
                .respond(FlowName::SuggestClauses, 0, clauses(&["H1D6", "H2D2"])),
        );

        orchestrator.submit("q", &NoSessionObserver).await.unwrap();

        assert_eq!(
            orchestrator.suggested_clause(2),
            Some(Clause::new("H2D2").unwrap())
        );
        assert!(orchestrator.suggested_clause(3).is_none());
    }
}
