//! Bounded exponential backoff

use crate::core::error::DomainError;
use crate::invocation::attempt::FailureKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of attempts per flow invocation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay; the wait after attempt `n` is `base * 2^n`
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then make another attempt
    Retry { after: Duration },
    /// The failure is fatal; report it as-is
    Fail,
    /// Transient failures used up every attempt
    Exhausted,
}

/// Retry policy for a flow invocation (Value Object)
///
/// Only transient failures are retried, and never more than
/// `max_attempts` attempts are made in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, DomainError> {
        if max_attempts == 0 {
            return Err(DomainError::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait after the given (1-based) attempt fails transiently
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Decide what follows a failed attempt
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDecision {
        match kind {
            FailureKind::Fatal => RetryDecision::Fail,
            FailureKind::Transient if attempt < self.max_attempts => RetryDecision::Retry {
                after: self.delay_after(attempt),
            },
            FailureKind::Transient => RetryDecision::Exhausted,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_after(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_transient_retries_until_exhausted() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(1, FailureKind::Transient),
            RetryDecision::Retry {
                after: Duration::from_secs(2)
            }
        );
        assert_eq!(
            policy.decide(2, FailureKind::Transient),
            RetryDecision::Retry {
                after: Duration::from_secs(4)
            }
        );
        assert_eq!(
            policy.decide(3, FailureKind::Transient),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn test_fatal_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(1, FailureKind::Fatal), RetryDecision::Fail);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(RetryPolicy::new(0, DEFAULT_BASE_DELAY).is_err());
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(
            policy.decide(1, FailureKind::Transient),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_after(64) >= policy.delay_after(31));
    }

    proptest! {
        #[test]
        fn delay_strictly_increases(base_ms in 1u64..10_000, attempt in 1u32..20) {
            let policy = RetryPolicy::new(32, Duration::from_millis(base_ms)).unwrap();
            prop_assert!(policy.delay_after(attempt + 1) > policy.delay_after(attempt));
            prop_assert_eq!(policy.delay_after(attempt + 1), policy.delay_after(attempt) * 2);
        }

        #[test]
        fn never_retries_past_max_attempts(max in 1u32..10, attempt in 1u32..20) {
            let policy = RetryPolicy::new(max, DEFAULT_BASE_DELAY).unwrap();
            let decision = policy.decide(attempt, FailureKind::Transient);
            if attempt >= max {
                prop_assert_eq!(decision, RetryDecision::Exhausted);
            } else {
                let is_retry = matches!(decision, RetryDecision::Retry { .. });
                prop_assert!(is_retry);
            }
        }
    }
}
