//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: the hosted model that serves every flow
//! - [`query::Query`]: a validated, immutable user query
//! - [`query::Clause`]: an opaque reference to a building-code clause
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod query;
pub mod string;
