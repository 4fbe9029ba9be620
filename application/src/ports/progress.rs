//! Progress notification port
//!
//! Defines the interface for reporting invocation attempts.

use bca_domain::{Attempt, FlowName};

/// Callback for attempt-level progress during a flow invocation
///
/// Implementations live in the presentation layer and can display
/// retries in various ways (console, spinner, etc.)
pub trait InvocationNotifier: Send + Sync {
    /// Called once per attempt, after its outcome is known
    fn on_attempt(&self, flow: FlowName, attempt: &Attempt);
}

/// No-op notifier for when progress reporting is not needed
pub struct NoProgress;

impl InvocationNotifier for NoProgress {
    fn on_attempt(&self, _flow: FlowName, _attempt: &Attempt) {}
}
