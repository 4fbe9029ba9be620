//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use bca_application::BehaviorConfig;
use bca_domain::{DomainError, Model, OutputFormat, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// Re-export OutputFormat from domain for convenience
pub use bca_domain::OutputFormat as FileOutputFormat;

/// Default endpoint for the Generative Language API
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("retry.max_attempts must be at least 1")]
    InvalidRetryAttempts,

    #[error("model.api_base cannot be empty")]
    EmptyApiBase,
}

/// Raw model endpoint configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model identifier
    pub name: String,
    /// Base URL of the model endpoint
    pub api_base: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// API key given directly (takes precedence over `api_key_env`)
    pub api_key: Option<String>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: Model::default().to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl FileModelConfig {
    /// Parse the configured model name
    pub fn parse_model(&self) -> Result<Model, DomainError> {
        self.name.parse()
    }

    /// Resolve the API key from the config or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Raw retry configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Maximum attempts per flow invocation
    pub max_attempts: u32,
    /// Base delay in milliseconds; the wait after attempt n is base * 2^n
    pub base_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts(),
            base_delay_ms: policy.base_delay().as_millis() as u64,
        }
    }
}

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for a single model call
    pub timeout_seconds: Option<u64>,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show progress indicators
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Path of the JSONL conversation transcript
    pub conversation_log: Option<String>,
    /// Path of the diagnostic log file (tracing output)
    pub file: Option<String>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model endpoint settings
    pub model: FileModelConfig,
    /// Retry settings
    pub retry: FileRetryConfig,
    /// Behavior settings
    pub behavior: FileBehaviorConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Timeout of 0 seconds doesn't make sense
        if let Some(0) = self.behavior.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.model.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        if self.model.api_base.trim().is_empty() {
            return Err(ConfigValidationError::EmptyApiBase);
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigValidationError::InvalidRetryAttempts);
        }

        Ok(())
    }

    /// Build the retry policy described by `[retry]`
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigValidationError> {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
        .map_err(|_| ConfigValidationError::InvalidRetryAttempts)
    }

    /// Build the application behavior configuration
    pub fn behavior_config(&self) -> Result<BehaviorConfig, ConfigValidationError> {
        Ok(BehaviorConfig::from_timeout_seconds(self.behavior.timeout_seconds)
            .with_retry_policy(self.retry_policy()?))
    }
}
