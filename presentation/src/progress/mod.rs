//! Progress reporting
//!
//! Every reporter is both a [`SessionObserver`] (slot results, notifications)
//! and an [`InvocationNotifier`] (retries), so one instance can be shared by
//! the flow invoker and the orchestrator.

pub mod reporter;

use bca_application::{InvocationNotifier, SessionObserver};
use reporter::{ProgressReporter, QuietReporter, SimpleProgress};
use std::sync::Arc;

/// How much progress output to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterKind {
    Spinner,
    Simple,
    Quiet,
}

impl ReporterKind {
    pub fn select(quiet: bool, show_progress: bool) -> Self {
        match (quiet, show_progress) {
            (true, _) => ReporterKind::Quiet,
            (false, true) => ReporterKind::Spinner,
            (false, false) => ReporterKind::Simple,
        }
    }
}

/// Build a reporter, returned as both the observer and the notifier handle
pub fn build_reporter(
    kind: ReporterKind,
) -> (Arc<dyn SessionObserver>, Arc<dyn InvocationNotifier>) {
    match kind {
        ReporterKind::Spinner => {
            let reporter = Arc::new(ProgressReporter::new());
            (reporter.clone(), reporter)
        }
        ReporterKind::Simple => (Arc::new(SimpleProgress), Arc::new(SimpleProgress)),
        ReporterKind::Quiet => (Arc::new(QuietReporter), Arc::new(QuietReporter)),
    }
}
