//! The three building-code flows

use crate::core::error::DomainError;
use crate::core::query::{Clause, Query};
use crate::flow::definition::{Flow, invalid_input};
use crate::flow::name::FlowName;
use crate::flow::schema;
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================== Answer Query ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerQueryInput {
    pub query: String,
}

impl AnswerQueryInput {
    pub fn new(query: &Query) -> Self {
        Self {
            query: query.content().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerQueryOutput {
    pub answer: String,
}

/// Answers a free-text question about the building code
pub struct AnswerQuery;

impl Flow for AnswerQuery {
    type Input = AnswerQueryInput;
    type Output = AnswerQueryOutput;

    const NAME: FlowName = FlowName::AnswerQuery;

    fn validate(input: &Self::Input) -> Result<(), DomainError> {
        if input.query.trim().is_empty() {
            return Err(invalid_input(Self::NAME, "query is blank"));
        }
        Ok(())
    }

    fn render_prompt(input: &Self::Input) -> String {
        PromptTemplate::answer_query(&input.query)
    }

    fn output_schema() -> Value {
        schema::object(&[(
            "answer",
            schema::string("The answer to the user's query about the building code."),
        )])
    }
}

// ==================== Suggest Clauses ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestClausesInput {
    pub query: String,
}

impl SuggestClausesInput {
    pub fn new(query: &Query) -> Self {
        Self {
            query: query.content().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestClausesOutput {
    pub clauses: Vec<String>,
}

impl SuggestClausesOutput {
    /// Suggested clauses, dropping blank entries and duplicates
    pub fn into_clauses(self) -> Vec<Clause> {
        let mut clauses: Vec<Clause> = Vec::with_capacity(self.clauses.len());
        for raw in self.clauses {
            if let Ok(clause) = Clause::new(raw)
                && !clauses.contains(&clause)
            {
                clauses.push(clause);
            }
        }
        clauses
    }
}

/// Suggests clauses related to a query
pub struct SuggestClauses;

impl Flow for SuggestClauses {
    type Input = SuggestClausesInput;
    type Output = SuggestClausesOutput;

    const NAME: FlowName = FlowName::SuggestClauses;

    fn validate(input: &Self::Input) -> Result<(), DomainError> {
        if input.query.trim().is_empty() {
            return Err(invalid_input(Self::NAME, "query is blank"));
        }
        Ok(())
    }

    fn render_prompt(input: &Self::Input) -> String {
        PromptTemplate::suggest_clauses(&input.query)
    }

    fn output_schema() -> Value {
        schema::object(&[(
            "clauses",
            schema::string_array("An array of relevant clauses related to the user query."),
        )])
    }
}

// ==================== Explain Clause ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainClauseInput {
    pub code_clause: String,
}

impl ExplainClauseInput {
    pub fn new(clause: &Clause) -> Self {
        Self {
            code_clause: clause.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainClauseOutput {
    pub explanation: String,
}

/// Explains the meaning and implications of one clause
pub struct ExplainClause;

impl Flow for ExplainClause {
    type Input = ExplainClauseInput;
    type Output = ExplainClauseOutput;

    const NAME: FlowName = FlowName::ExplainClause;

    fn validate(input: &Self::Input) -> Result<(), DomainError> {
        if input.code_clause.trim().is_empty() {
            return Err(invalid_input(Self::NAME, "codeClause is blank"));
        }
        Ok(())
    }

    fn render_prompt(input: &Self::Input) -> String {
        PromptTemplate::explain_clause(&input.code_clause)
    }

    fn output_schema() -> Value {
        schema::object(&[(
            "explanation",
            schema::string("A clear and concise explanation of the code clause."),
        )])
    }
}
