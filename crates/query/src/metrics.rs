//! Metrics hooks for the query engine.
//!
//! Callers install a global `QueryMetrics` implementation via [`set_query_metrics`];
//! every `QueryEngine` then reports latency and result counts for `execute` and
//! `suggest`, plus each call that ran out of time. Instrumentation stays
//! decoupled from any specific metrics backend.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for query operations.
pub trait QueryMetrics: Send + Sync {
    /// A successful `execute`: `total` matches before pagination, `returned`
    /// hits on the requested page.
    fn record_execute(&self, index_id: &str, latency: Duration, total: usize, returned: usize);

    /// A successful `suggest` returning `returned` values.
    fn record_suggest(&self, index_id: &str, latency: Duration, returned: usize);

    /// A call that failed with `QueryTimeout` after exhausting `budget`.
    fn record_timeout(&self, index_id: &str, budget: Duration);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn QueryMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn QueryMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn QueryMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global query metrics recorder.
///
/// Typically called once during service start-up so all engines share the
/// same backend.
pub fn set_query_metrics(recorder: Option<Arc<dyn QueryMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
