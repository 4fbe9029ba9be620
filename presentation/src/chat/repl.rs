//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::chat::command::{ExplainTarget, ReplCommand};
use crate::config::ReplConfig;
use bca_application::{ModelGateway, QueryOrchestrator, SessionObserver};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;

/// Maximum number of lines kept in the history file
const HISTORY_CAPACITY: usize = 1000;

/// Interactive chat REPL
pub struct ChatRepl<G: ModelGateway + 'static> {
    orchestrator: QueryOrchestrator<G>,
    observer: Arc<dyn SessionObserver>,
    config: ReplConfig,
}

impl<G: ModelGateway + 'static> ChatRepl<G> {
    pub fn new(orchestrator: QueryOrchestrator<G>, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            orchestrator,
            observer,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator<G> {
        &self.orchestrator
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();

        let Some(path) = self.config.history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                eprintln!("{} Could not open history file: {}", "!".yellow(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("bca".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    if self.handle_line(&line).await {
                        break;
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process one input line. Returns true if the REPL should exit.
    pub async fn handle_line(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        match ReplCommand::parse(line) {
            Some(command) => self.handle_command(command).await,
            None => {
                // Empty input was filtered above, so this cannot be rejected
                if let Err(e) = self.orchestrator.submit(line, self.observer.as_ref()).await {
                    eprintln!("{} {}", "Error:".red(), e);
                }
                false
            }
        }
    }

    async fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::Clauses => {
                let session = self.orchestrator.snapshot();
                println!("{}", ConsoleFormatter::format_clauses(session.suggested_clauses()));
            }
            ReplCommand::History => {
                let session = self.orchestrator.snapshot();
                println!("{}", ConsoleFormatter::format_history(&session));
            }
            ReplCommand::Close => self.orchestrator.dismiss_explanation(),
            ReplCommand::Explain(target) => self.explain(target).await,
            ReplCommand::Usage(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn explain(&self, target: ExplainTarget) {
        let clause = match target {
            ExplainTarget::Clause(clause) => clause,
            ExplainTarget::Position(position) => {
                match self.orchestrator.suggested_clause(position) {
                    Some(clause) => clause.as_str().to_string(),
                    None => {
                        println!("No suggested clause #{}. Use /clauses to list them.", position);
                        return;
                    }
                }
            }
        };

        // Failures are already reported through the observer
        let _ = self
            .orchestrator
            .explain(&clause, self.observer.as_ref())
            .await;
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│     Building Code of Australia Assistant    │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Model: {}",
            self.orchestrator.flows().invoker().gateway().model()
        );
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /explain <clause|n>  - Explain a clause (or the n-th suggestion)");
        println!("  /close               - Close the current explanation");
        println!("  /clauses             - Show suggested clauses");
        println!("  /history             - Show the conversation so far");
        println!("  /help, /h, /?        - Show this help");
        println!("  /quit, /exit, /q     - Exit chat");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bca_application::{
        CodeAssistFlows, FlowInvoker, GatewayError, GenerationRequest, NoSessionObserver,
    };
    use bca_domain::{FlowName, Model, RetryPolicy};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    struct CannedGateway {
        model: Model,
        calls: Mutex<Vec<FlowName>>,
    }

    #[async_trait]
    impl ModelGateway for CannedGateway {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<Value, GatewayError> {
            self.calls.lock().unwrap().push(request.flow);
            Ok(match request.flow {
                FlowName::AnswerQuery => json!({ "answer": "Yes." }),
                FlowName::SuggestClauses => json!({ "clauses": ["C2D9", "H1D6"] }),
                FlowName::ExplainClause => json!({ "explanation": "Plain words." }),
            })
        }
    }

    fn repl() -> (ChatRepl<CannedGateway>, Arc<CannedGateway>) {
        let gateway = Arc::new(CannedGateway {
            model: Model::default(),
            calls: Mutex::new(Vec::new()),
        });
        let invoker = FlowInvoker::new(Arc::clone(&gateway)).with_policy(RetryPolicy::no_retry());
        let orchestrator = QueryOrchestrator::new(CodeAssistFlows::new(invoker));
        let repl = ChatRepl::new(orchestrator, Arc::new(NoSessionObserver)).with_config(
            ReplConfig {
                show_progress: false,
                history_file: None,
            },
        );
        (repl, gateway)
    }

    #[tokio::test]
    async fn test_blank_line_does_nothing() {
        let (repl, gateway) = repl();
        assert!(!repl.handle_line("   ").await);
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_then_explain_by_position() {
        let (repl, gateway) = repl();

        assert!(!repl.handle_line("Garage wall?").await);
        assert_eq!(repl.orchestrator().snapshot().messages().len(), 2);

        assert!(!repl.handle_line("/explain 2").await);
        let session = repl.orchestrator().snapshot();
        let explanation = session.explanation().unwrap();
        assert_eq!(explanation.clause.as_str(), "H1D6");
        assert_eq!(explanation.content, "Plain words.");
        assert_eq!(gateway.calls.lock().unwrap().len(), 3);

        assert!(!repl.handle_line("/close").await);
        assert!(repl.orchestrator().snapshot().explanation().is_none());
    }

    #[tokio::test]
    async fn test_explain_unknown_position_makes_no_call() {
        let (repl, gateway) = repl();
        assert!(!repl.handle_line("/explain 1").await);
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quit_exits() {
        let (repl, _) = repl();
        assert!(repl.handle_line("/quit").await);
        assert!(!repl.handle_line("/help").await);
    }
}
