//! Query metrics reported as structured `tracing` events.

use docsearch::QueryMetrics;
use std::time::Duration;

/// Emits one event per engine call under the `docsearch::metrics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl QueryMetrics for TracingMetrics {
    fn record_execute(&self, index_id: &str, latency: Duration, total: usize, returned: usize) {
        tracing::info!(
            target: "docsearch::metrics",
            index_id,
            latency_us = latency.as_micros() as u64,
            total,
            returned,
            "execute"
        );
    }

    fn record_suggest(&self, index_id: &str, latency: Duration, returned: usize) {
        tracing::info!(
            target: "docsearch::metrics",
            index_id,
            latency_us = latency.as_micros() as u64,
            returned,
            "suggest"
        );
    }

    fn record_timeout(&self, index_id: &str, budget: Duration) {
        tracing::warn!(
            target: "docsearch::metrics",
            index_id,
            budget_ms = budget.as_millis() as u64,
            "timeout"
        );
    }
}
