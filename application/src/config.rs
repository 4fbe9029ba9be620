//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as API timeouts and retry policies.

use bca_domain::RetryPolicy;
use std::time::Duration;

/// Application behavior configuration.
///
/// Controls runtime behavior of use cases like timeout limits for model calls
/// and the retry policy applied to every flow invocation.
#[derive(Debug, Clone, Default)]
pub struct BehaviorConfig {
    /// Maximum time to wait for a single attempt before timing out.
    pub timeout: Option<Duration>,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig with a timeout specified in seconds.
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self {
            timeout: Some(Duration::from_secs(seconds)),
            ..Default::default()
        }
    }

    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
            ..Default::default()
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
