//! Console output formatter for answers, clauses and explanations

use bca_application::{Notification, SubmissionReport};
use bca_domain::core::string::truncate;
use bca_domain::{ChatSession, Clause, Explanation, Message, Role};
use colored::Colorize;
use serde_json::json;

/// Width of history previews
const PREVIEW_LEN: usize = 72;

/// Formats chat session content for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an assistant (or user) message
    pub fn format_message(message: &Message) -> String {
        match message.role {
            Role::User => format!("{} {}", "You:".bold(), message.content),
            Role::Assistant => format!("{}\n{}", "Assistant:".cyan().bold(), message.content),
        }
    }

    /// Format the suggested clause list as a numbered list
    pub fn format_clauses(clauses: &[Clause]) -> String {
        if clauses.is_empty() {
            return "No relevant clauses suggested.".dimmed().to_string();
        }

        let mut output = format!("{}\n", "Relevant clauses:".cyan().bold());
        for (i, clause) in clauses.iter().enumerate() {
            output.push_str(&format!("  {:>2}. {}\n", i + 1, clause.as_str().yellow()));
        }
        output.push_str(&format!(
            "{}",
            "Use /explain <number> to explain a clause.".dimmed()
        ));
        output
    }

    pub fn format_explanation(explanation: &Explanation) -> String {
        let title = format!("── Clause {} ──", explanation.clause);
        format!(
            "{}\n{}\n{}",
            title.yellow().bold(),
            explanation.content,
            "─".repeat(title.chars().count()).yellow()
        )
    }

    /// Format a toast-style notification (rendered on stderr)
    pub fn format_notification(notification: &Notification) -> String {
        format!(
            "{} {}",
            format!(" {} ", notification.title).on_red().white().bold(),
            notification.description.red()
        )
    }

    /// One line per message, truncated
    pub fn format_history(session: &ChatSession) -> String {
        if session.messages().is_empty() {
            return "No messages yet.".dimmed().to_string();
        }

        session
            .messages()
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => "you".bold(),
                    Role::Assistant => "bca".cyan(),
                };
                let preview = truncate(&message.content.replace('\n', " "), PREVIEW_LEN);
                format!("  {:>3} {}", role, preview)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON document for a completed single-shot submission
    pub fn format_submission_json(report: &SubmissionReport, session: &ChatSession) -> String {
        let answer = session
            .messages()
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .map(|m| m.content.as_str());
        let query = session
            .messages()
            .iter()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str());

        let document = json!({
            "query": query,
            "answer": answer,
            "clauses": session.suggested_clauses(),
            "status": report,
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_explanation_json(explanation: &Explanation) -> String {
        serde_json::to_string_pretty(explanation).unwrap_or_else(|_| "{}".to_string())
    }
}
