//! Model value object representing the hosted model behind every flow

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hosted models that can serve the flows (Value Object)
///
/// All three flows run against the same model; the identifier is passed
/// verbatim to the model endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Gemini20Flash,
    Gemini25Flash,
    Gemini25Pro,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Custom(s) => s,
        }
    }

    /// Models known to support structured (schema-constrained) output
    pub fn known_models() -> Vec<Model> {
        vec![Model::Gemini20Flash, Model::Gemini25Flash, Model::Gemini25Pro]
    }
}

impl Default for Model {
    /// Returns the default model (Gemini 2.0 Flash)
    fn default() -> Self {
        Model::Gemini20Flash
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        // Accept the "googleai/" prefix used by some model catalogs
        let s = s.strip_prefix("googleai/").unwrap_or(s);
        Ok(match s {
            "" => return Err(DomainError::InvalidModel("model name is empty".to_string())),
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
