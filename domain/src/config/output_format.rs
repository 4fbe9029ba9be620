//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for answers, clause suggestions and explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable console output (default)
    #[default]
    Text,
    /// JSON snapshot of the chat session
    Json,
}
