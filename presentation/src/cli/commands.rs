//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for answers and explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console output
    Text,
    /// JSON snapshot of the chat session
    Json,
}

impl From<OutputFormat> for bca_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => bca_domain::OutputFormat::Text,
            OutputFormat::Json => bca_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for bca-assist
#[derive(Parser, Debug)]
#[command(name = "bca-assist")]
#[command(author, version, about = "Ask questions about the Building Code of Australia")]
#[command(long_about = r#"
bca-assist answers questions about the Building Code of Australia.

Every question runs two model calls side by side:
1. Answer: a direct answer grounded in the code
2. Clauses: the code clauses most relevant to the question

Any suggested clause can then be explained in plain language.

Configuration files are loaded from (in priority order):
1. BCA_* environment variables (e.g. BCA_MODEL__NAME)
2. --config <path>        Explicit config file
3. ./bca-assist.toml      Project-level config
4. ~/.config/bca-assist/config.toml   Global config

Example:
  bca-assist "What fire separation is required between a garage and a house?"
  bca-assist --explain "C2D9"
  bca-assist --chat -m gemini-2.5-flash
"#)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub query: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long, conflicts_with = "explain")]
    pub chat: bool,

    /// Explain a single code clause and exit
    #[arg(short, long, value_name = "CLAUSE")]
    pub explain: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_single_query() {
        let cli = Cli::try_parse_from(["bca-assist", "-vv", "What is a Class 10a building?"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("What is a Class 10a building?"));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.chat);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_parse_explain_with_json_output() {
        let cli = Cli::try_parse_from(["bca-assist", "--explain", "C2D9", "-o", "json"]).unwrap();
        assert_eq!(cli.explain.as_deref(), Some("C2D9"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(
            bca_domain::OutputFormat::from(OutputFormat::Json),
            bca_domain::OutputFormat::Json
        );
    }

    #[test]
    fn test_chat_conflicts_with_explain() {
        assert!(Cli::try_parse_from(["bca-assist", "--chat", "--explain", "C2D9"]).is_err());
    }
}
