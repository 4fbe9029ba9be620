//! Slash commands understood by the chat REPL

/// Which clause `/explain` refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainTarget {
    /// 1-based position in the suggested clause list
    Position(usize),
    /// A clause identifier typed out in full
    Clause(String),
}

impl ExplainTarget {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(position) => ExplainTarget::Position(position),
            Err(_) => ExplainTarget::Clause(arg.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Explain(ExplainTarget),
    /// Close the current explanation
    Close,
    Clauses,
    History,
    Help,
    Quit,
    /// A known command used without its required argument
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`; returns `None` for ordinary input
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "explain" | "e" if arg.is_empty() => {
                ReplCommand::Usage("/explain <clause or number>")
            }
            "explain" | "e" => ReplCommand::Explain(ExplainTarget::parse(arg)),
            "close" => ReplCommand::Close,
            "clauses" | "c" => ReplCommand::Clauses,
            "history" => ReplCommand::History,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(format!("/{}", name)),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(ReplCommand::parse("What is a Class 1b building?"), None);
    }

    #[test]
    fn test_parse_explain_targets() {
        assert_eq!(
            ReplCommand::parse("/explain 2"),
            Some(ReplCommand::Explain(ExplainTarget::Position(2)))
        );
        assert_eq!(
            ReplCommand::parse("/e   C2D9 "),
            Some(ReplCommand::Explain(ExplainTarget::Clause("C2D9".to_string())))
        );
        assert_eq!(
            ReplCommand::parse("/explain Part H2"),
            Some(ReplCommand::Explain(ExplainTarget::Clause("Part H2".to_string())))
        );
    }

    #[test]
    fn test_explain_without_argument() {
        assert!(matches!(
            ReplCommand::parse("/explain"),
            Some(ReplCommand::Usage(_))
        ));
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/?"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/c"), Some(ReplCommand::Clauses));
        assert_eq!(
            ReplCommand::parse("/models"),
            Some(ReplCommand::Unknown("/models".to_string()))
        );
    }
}
