//! Configuration file loading for bca-assist
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `BCA_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./bca-assist.toml` or `./.bca-assist.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/bca-assist/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_API_BASE, DEFAULT_API_KEY_ENV, FileBehaviorConfig, FileConfig,
    FileLoggingConfig, FileModelConfig, FileOutputConfig, FileOutputFormat, FileReplConfig,
    FileRetryConfig,
};
pub use loader::ConfigLoader;
