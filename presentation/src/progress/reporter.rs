//! Progress reporting for submissions and clause explanations

use crate::output::console::ConsoleFormatter;
use bca_application::{InvocationNotifier, Notification, SessionObserver, SubmissionReport};
use bca_domain::{
    Attempt, AttemptOutcome, Clause, Explanation, FlowName, Message, Query, SubmissionId,
};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn spinner_label(flow: FlowName) -> &'static str {
    match flow {
        FlowName::AnswerQuery => "Answering",
        FlowName::SuggestClauses => "Finding relevant clauses",
        FlowName::ExplainClause => "Explaining clause",
    }
}

/// One-line description of a failed attempt that will be retried
fn retry_line(attempt: &Attempt) -> Option<String> {
    let backoff = attempt.backoff?;
    let error = match &attempt.outcome {
        AttemptOutcome::TransientFailure { error } | AttemptOutcome::FatalFailure { error } => {
            error.as_str()
        }
        AttemptOutcome::Success => return None,
    };
    Some(format!(
        "attempt {} failed ({}), retrying in {:.1}s",
        attempt.ordinal,
        error,
        backoff.as_secs_f64()
    ))
}

/// Reports progress with spinners, one per in-flight sub-call
pub struct ProgressReporter {
    multi: MultiProgress,
    spinners: Mutex<HashMap<FlowName, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinners: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn spinners(&self) -> MutexGuard<'_, HashMap<FlowName, ProgressBar>> {
        self.spinners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(&self, flow: FlowName) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(spinner_label(flow));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Some(previous) = self.spinners().insert(flow, pb) {
            previous.finish_and_clear();
        }
    }

    fn finish(&self, flow: FlowName) {
        if let Some(pb) = self.spinners().remove(&flow) {
            pb.finish_and_clear();
        }
    }

    /// Print above the spinners without tearing them
    fn print(&self, text: &str) {
        if self.multi.println(text).is_err() {
            println!("{}", text);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ProgressReporter {
    fn on_submission_started(&self, _id: SubmissionId, _query: &Query) {
        self.start(FlowName::AnswerQuery);
        self.start(FlowName::SuggestClauses);
    }

    fn on_answer(&self, _id: SubmissionId, message: &Message) {
        self.finish(FlowName::AnswerQuery);
        self.print(&format!("\n{}\n", ConsoleFormatter::format_message(message)));
    }

    fn on_clauses(&self, _id: SubmissionId, clauses: &[Clause]) {
        self.finish(FlowName::SuggestClauses);
        self.print(&format!("{}\n", ConsoleFormatter::format_clauses(clauses)));
    }

    fn on_explanation_started(&self, _clause: &Clause) {
        self.start(FlowName::ExplainClause);
    }

    fn on_explanation(&self, explanation: &Explanation) {
        self.finish(FlowName::ExplainClause);
        self.print(&format!(
            "\n{}\n",
            ConsoleFormatter::format_explanation(explanation)
        ));
    }

    fn notify(&self, notification: &Notification) {
        self.finish(FlowName::ExplainClause);
        self.multi
            .suspend(|| eprintln!("{}", ConsoleFormatter::format_notification(notification)));
    }
}

impl InvocationNotifier for ProgressReporter {
    fn on_attempt(&self, flow: FlowName, attempt: &Attempt) {
        if let Some(line) = retry_line(attempt)
            && let Some(pb) = self.spinners().get(&flow)
        {
            pb.set_message(line.yellow().to_string());
        }
    }
}

/// Simple text-based progress (no spinners)
pub struct SimpleProgress;

impl SessionObserver for SimpleProgress {
    fn on_submission_started(&self, id: SubmissionId, _query: &Query) {
        println!("{} Submitting {}", "->".cyan(), id);
    }

    fn on_answer(&self, _id: SubmissionId, message: &Message) {
        println!("\n{}\n", ConsoleFormatter::format_message(message));
    }

    fn on_clauses(&self, _id: SubmissionId, clauses: &[Clause]) {
        println!("{}\n", ConsoleFormatter::format_clauses(clauses));
    }

    fn on_submission_complete(&self, report: &SubmissionReport) {
        println!(
            "{} {} complete (answer: {:?}, clauses: {:?})",
            "v".green(),
            report.id,
            report.answer,
            report.clauses
        );
    }

    fn on_explanation_started(&self, clause: &Clause) {
        println!("{} Explaining {}", "->".cyan(), clause);
    }

    fn on_explanation(&self, explanation: &Explanation) {
        println!("\n{}\n", ConsoleFormatter::format_explanation(explanation));
    }

    fn notify(&self, notification: &Notification) {
        eprintln!("{}", ConsoleFormatter::format_notification(notification));
    }
}

impl InvocationNotifier for SimpleProgress {
    fn on_attempt(&self, flow: FlowName, attempt: &Attempt) {
        if let Some(line) = retry_line(attempt) {
            println!("  {} {}: {}", "!".yellow(), flow, line);
        }
    }
}

/// Prints nothing but notifications
///
/// Used for `--quiet` and JSON output, where stdout carries only the result.
pub struct QuietReporter;

impl SessionObserver for QuietReporter {
    fn notify(&self, notification: &Notification) {
        eprintln!("{}", ConsoleFormatter::format_notification(notification));
    }
}

impl InvocationNotifier for QuietReporter {
    fn on_attempt(&self, _flow: FlowName, _attempt: &Attempt) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use bca_domain::FailureKind;

    #[test]
    fn test_retry_line_only_for_retried_attempts() {
        assert!(retry_line(&Attempt::succeeded(1)).is_none());
        assert!(retry_line(&Attempt::failed(3, FailureKind::Transient, "503")).is_none());

        let attempt = Attempt::failed(1, FailureKind::Transient, "503 Service Unavailable: busy")
            .with_backoff(Duration::from_millis(2000));
        assert_eq!(
            retry_line(&attempt).unwrap(),
            "attempt 1 failed (503 Service Unavailable: busy), retrying in 2.0s"
        );
    }

    #[test]
    fn test_spinner_lifecycle() {
        let query = Query::new("q").unwrap();
        let id = bca_domain::ChatSession::new().begin_submission(query.clone());
        let reporter = ProgressReporter::new();
        reporter.on_submission_started(id, &query);
        assert_eq!(reporter.spinners().len(), 2);

        reporter.on_attempt(
            FlowName::AnswerQuery,
            &Attempt::failed(1, FailureKind::Transient, "503")
                .with_backoff(Duration::from_millis(2000)),
        );
        reporter.on_answer(id, &Message::assistant("a"));
        reporter.on_clauses(id, &[]);
        assert!(reporter.spinners().is_empty());
    }
}
