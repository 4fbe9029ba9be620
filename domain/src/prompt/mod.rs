//! Prompt templates for the building-code flows

mod template;

pub use template::PromptTemplate;
