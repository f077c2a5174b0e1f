//! Item — per-log records flowing through the streaming pipeline.

use std::time::Instant;

use serde::Serialize;

/// A raw log line stamped with its arrival time by the producer.
///
/// Created once per input line, handed to the consumer over the queue,
/// and recorded exactly once; items are never retried or re-queued.
#[derive(Debug)]
pub struct LogItem {
    pub line: String,
    pub arrival: Instant,
}

/// One row of the append-only metrics store.
///
/// Offsets are seconds since the run origin so rows serialize as plain
/// floats. `latency_secs` is end − arrival by definition (user-perceived
/// response time under load), not end − start.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub arrival_secs: f64,
    pub start_secs: f64,
    pub end_secs: f64,
    pub latency_secs: f64,
    pub cache_hit: bool,
    pub model_invoked: bool,
    /// `None` when the fallback call failed under the skip policy.
    pub template_index: Option<usize>,
}

impl MetricsRecord {
    /// Active processing time (dequeue to record), used for busy-time
    /// throughput.
    pub fn processing_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}
