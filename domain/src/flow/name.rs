//! Flow names

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Identifies one of the remote prompt/schema pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowName {
    #[serde(rename = "answerBcaQueryFlow")]
    AnswerQuery,
    #[serde(rename = "suggestRelevantClausesFlow")]
    SuggestClauses,
    #[serde(rename = "explainCodeClauseFlow")]
    ExplainClause,
}

impl FlowName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowName::AnswerQuery => "answerBcaQueryFlow",
            FlowName::SuggestClauses => "suggestRelevantClausesFlow",
            FlowName::ExplainClause => "explainCodeClauseFlow",
        }
    }

    pub fn all() -> [FlowName; 3] {
        [
            FlowName::AnswerQuery,
            FlowName::SuggestClauses,
            FlowName::ExplainClause,
        ]
    }
}

impl std::fmt::Display for FlowName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FlowName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowName::all()
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| DomainError::UnknownFlow(s.to_string()))
    }
}
