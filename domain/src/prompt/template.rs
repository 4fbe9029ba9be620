//! Prompt templates for the building-code flows

/// The document every prompt is scoped to
pub const CODE_DOCUMENT: &str = "the Building Code of Australia (BCA) 2022 Volumes 1 & 2";

/// Templates for generating prompts for each flow
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt for answering a free-text query
    pub fn answer_query(query: &str) -> String {
        format!(
            r#"You are an expert in {}.

Answer the user's question accurately and concisely, in a conversational tone.
Reference the relevant clauses or sections where appropriate.
If the code does not address the question, say so rather than guessing.

User Query: {}"#,
            CODE_DOCUMENT, query
        )
    }

    /// Prompt for suggesting clauses related to a query
    pub fn suggest_clauses(query: &str) -> String {
        format!(
            r#"You are an expert in {}.

Based on the user's query, suggest other relevant clauses that might be related to their query, even if they don't contain the exact search term.

User Query: {}"#,
            CODE_DOCUMENT, query
        )
    }

    /// Prompt for explaining a single clause
    pub fn explain_clause(code_clause: &str) -> String {
        format!(
            r#"You are an expert in {}.

A user has provided the following code clause or section:
{}

Provide a clear and concise explanation of its meaning and implications, in a conversational tone."#,
            CODE_DOCUMENT, code_clause
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_query_contains_query() {
        let prompt = PromptTemplate::answer_query("Minimum stair riser height?");
        assert!(prompt.contains("User Query: Minimum stair riser height?"));
        assert!(prompt.contains(CODE_DOCUMENT));
    }

    #[test]
    fn test_suggest_clauses_mentions_related() {
        let prompt = PromptTemplate::suggest_clauses("balustrade height");
        assert!(prompt.contains("balustrade height"));
        assert!(prompt.contains("relevant clauses"));
    }

    #[test]
    fn test_explain_clause_embeds_clause_on_own_line() {
        let prompt = PromptTemplate::explain_clause("H1D6 Framing");
        assert!(prompt.contains("section:\nH1D6 Framing\n"));
    }
}
