//! Invocation domain: how a single flow call is attempted and retried.
//!
//! - [`policy::RetryPolicy`]: bounded exponential backoff
//! - [`attempt::Attempt`]: record of one try against the model endpoint
//! - [`attempt::FailureKind`]: transient vs. fatal classification

pub mod attempt;
pub mod policy;
