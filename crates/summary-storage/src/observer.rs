use std::path::Path;

use summary_core::SummaryRecord;

use crate::daily_log::PersistOutcome;
use crate::StoreError;

/// Receives store diagnostics. Nothing reported here feeds back into results.
pub trait StoreObserver: Send + Sync {
    fn summary_added(&self, _record: &SummaryRecord, _formatted: &str) {}

    fn summaries_cleared(&self, _count: usize) {}

    fn summaries_persisted(&self, _path: &Path, _count: usize, _outcome: PersistOutcome) {}

    fn persist_failed(&self, _err: &StoreError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn summary_added(&self, record: &SummaryRecord, formatted: &str) {
        tracing::info!(id = %record.id, summary = %formatted, "summary added");
    }

    fn summaries_cleared(&self, count: usize) {
        tracing::info!(count, "summaries cleared");
    }

    fn summaries_persisted(&self, path: &Path, count: usize, outcome: PersistOutcome) {
        tracing::info!(
            path = %path.display(),
            count,
            mode = outcome.as_str(),
            "summaries persisted"
        );
    }

    fn persist_failed(&self, err: &StoreError) {
        tracing::error!(error = %err, "failed to persist summaries");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StoreObserver for NoopObserver {}
