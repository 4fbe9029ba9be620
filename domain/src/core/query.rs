//! Query and Clause value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question about the building code (Value Object)
///
/// Immutable once submitted. Construction rejects empty or
/// whitespace-only text, so a `Query` is always safe to hand to a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a new query, rejecting blank input
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::EmptyQuery)
        } else {
            Ok(Self { content })
        }
    }

    /// Try to create a new query, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        Self::new(content).ok()
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Query::new(s)
    }
}

impl TryFrom<&str> for Query {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Query::new(s)
    }
}

impl From<Query> for String {
    fn from(q: Query) -> Self {
        q.content
    }
}

/// A section reference within the building code (Value Object)
///
/// Treated as an opaque identifier, e.g. `"Part 3.7.2 Fire separation"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Clause(String);

impl Clause {
    pub fn new(reference: impl Into<String>) -> Result<Self, DomainError> {
        let reference = reference.into();
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            Err(DomainError::EmptyClause)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Clause {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Clause::new(s)
    }
}

impl From<Clause> for String {
    fn from(c: Clause) -> Self {
        c.0
    }
}
