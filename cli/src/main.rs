//! CLI entrypoint for bca-assist
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use bca_application::{
    CodeAssistFlows, ConversationLogger, FlowInvoker, NoConversationLogger, QueryOrchestrator,
};
use bca_domain::{Model, SlotState};
use bca_infrastructure::{ConfigLoader, FileConfig, GeminiGateway, JsonlConversationLogger};
use bca_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputConfig, ReplConfig, ReporterKind, build_reporter,
};
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*, reload};

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;
type FileLayerHandle = reload::Handle<Option<FileLayer>, Registry>;

/// Initialize stderr logging based on verbosity level
///
/// The returned handle attaches the file layer once the configuration is known.
fn init_logging(verbose: u8) -> FileLayerHandle {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, handle) = reload::Layer::new(None::<FileLayer>);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    handle
}

/// Split a log file path into the directory and file name the appender expects
fn log_file_target(path: &Path) -> (PathBuf, OsString) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "bca-assist.log".into());
    (dir, name)
}

/// Mirror log output to a file
fn attach_log_file(handle: &FileLayerHandle, path: &str) -> Option<WorkerGuard> {
    let (dir, name) = log_file_target(Path::new(path));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
    match handle.reload(Some(layer)) {
        Ok(()) => Some(guard),
        Err(e) => {
            warn!("Failed to attach log file {}: {}", path, e);
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    config.validate()?;
    Ok(config)
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    config
        .logging
        .conversation_log
        .as_deref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| {
            info!("Writing conversation log to {}", logger.path().display());
            Arc::new(logger) as Arc<dyn ConversationLogger>
        })
        .unwrap_or_else(|| Arc::new(NoConversationLogger))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let log_handle = init_logging(cli.verbose);
    let config = load_config(&cli)?;
    let _log_guard = config
        .logging
        .file
        .as_deref()
        .and_then(|path| attach_log_file(&log_handle, path));

    info!("Starting bca-assist");

    let output = OutputConfig {
        format: cli
            .output
            .map(Into::into)
            .or(config.output.format)
            .unwrap_or_default(),
        color: config.output.color && !cli.no_color,
    };
    output.apply();

    let model: Model = match &cli.model {
        Some(name) => name.parse()?,
        None => config.model.parse_model()?,
    };

    let Some(api_key) = config.model.resolve_api_key() else {
        bail!(
            "No API key found. Set {} or model.api_key in the config file.",
            config.model.api_key_env
        );
    };

    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress,
        history_file: config.repl.history_file.clone(),
    };
    let quiet = cli.quiet || (output.is_json() && !cli.chat);
    let (observer, notifier) =
        build_reporter(ReporterKind::select(quiet, repl_config.show_progress));

    // === Dependency Injection ===
    let gateway = Arc::new(GeminiGateway::new(&config.model.api_base, api_key, model)?);
    let invoker = FlowInvoker::new(gateway)
        .with_behavior(&config.behavior_config()?)
        .with_notifier(notifier);
    let orchestrator = QueryOrchestrator::new(CodeAssistFlows::new(invoker))
        .with_logger(conversation_logger(&config));

    // Chat mode
    if cli.chat {
        ChatRepl::new(orchestrator, observer)
            .with_config(repl_config)
            .run()
            .await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single clause explanation
    if let Some(clause) = &cli.explain {
        let explanation = orchestrator.explain(clause, observer.as_ref()).await?;
        if output.is_json() {
            println!("{}", ConsoleFormatter::format_explanation_json(&explanation));
        } else if quiet {
            println!("{}", ConsoleFormatter::format_explanation(&explanation));
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Single question mode - query is required
    let Some(query) = cli.query else {
        bail!("A question is required. Use --chat for interactive mode.");
    };

    let report = orchestrator.submit(&query, observer.as_ref()).await?;
    let session = orchestrator.snapshot();
    if output.is_json() {
        println!(
            "{}",
            ConsoleFormatter::format_submission_json(&report, &session)
        );
    } else if quiet {
        if let Some(answer) = session.messages().last() {
            println!("{}\n", ConsoleFormatter::format_message(answer));
        }
        println!("{}", ConsoleFormatter::format_clauses(session.suggested_clauses()));
    }

    if report.answer == SlotState::Failed {
        warn!("Submission {} finished without an answer", report.id);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_target_splits_directory_and_name() {
        let (dir, name) = log_file_target(Path::new("/var/log/bca/assist.log"));
        assert_eq!(dir, PathBuf::from("/var/log/bca"));
        assert_eq!(name, OsString::from("assist.log"));
    }

    #[test]
    fn test_log_file_target_defaults_to_current_directory() {
        let (dir, name) = log_file_target(Path::new("assist.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, OsString::from("assist.log"));
    }
}
