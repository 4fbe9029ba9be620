//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod flows;
pub mod invoke_flow;
pub mod submit_query;
