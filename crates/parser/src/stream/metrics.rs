//! Metrics — append-only per-item records and end-of-run aggregation.
//!
//! The store is owned by the single consumer, so recording is plain
//! appends; aggregation happens once after the input is exhausted.

use serde::Serialize;

use super::item::MetricsRecord;

/// Ordered per-item records plus the running token tally.
#[derive(Debug, Default)]
pub struct StreamMetrics {
    records: Vec<MetricsRecord>,
    tokens: u64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. Exactly one call per processed item.
    pub fn record(&mut self, record: MetricsRecord) {
        self.records.push(record);
    }

    pub fn add_tokens(&mut self, tokens: u32) {
        self.tokens += u64::from(tokens);
    }

    pub fn records(&self) -> &[MetricsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate statistics over the whole run.
    pub fn summarize(&self) -> RunSummary {
        let total = self.records.len();
        let hits = self.records.iter().filter(|r| r.cache_hit).count();
        let failed = self
            .records
            .iter()
            .filter(|r| r.template_index.is_none())
            .count();
        let model_invocations = self.records.iter().filter(|r| r.model_invoked).count();

        let latency_sum: f64 = self.records.iter().map(|r| r.latency_secs).sum();
        let max_latency_secs = self
            .records
            .iter()
            .map(|r| r.latency_secs)
            .fold(0.0, f64::max);
        let busy_secs: f64 = self.records.iter().map(|r| r.processing_secs()).sum();

        RunSummary {
            total,
            hits,
            failed,
            model_invocations,
            tokens_consumed: self.tokens,
            mean_latency_secs: if total > 0 { latency_sum / total as f64 } else { 0.0 },
            max_latency_secs,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
            throughput: if busy_secs > 0.0 { total as f64 / busy_secs } else { 0.0 },
        }
    }
}

/// Aggregate latency/throughput/hit-rate statistics for one run.
///
/// Throughput is consumer busy-time based (items over summed active
/// processing durations), not wall-clock based.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub hits: usize,
    pub failed: usize,
    pub model_invocations: usize,
    pub tokens_consumed: u64,
    pub mean_latency_secs: f64,
    pub max_latency_secs: f64,
    pub hit_rate: f64,
    pub throughput: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        arrival: f64,
        start: f64,
        end: f64,
        cache_hit: bool,
        template_index: Option<usize>,
    ) -> MetricsRecord {
        MetricsRecord {
            arrival_secs: arrival,
            start_secs: start,
            end_secs: end,
            latency_secs: end - arrival,
            cache_hit,
            model_invoked: !cache_hit,
            template_index,
        }
    }

    #[test]
    fn test_empty_summary_is_all_zero() {
        let metrics = StreamMetrics::new();
        let summary = metrics.summarize();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_latency_secs, 0.0);
        assert_eq!(summary.max_latency_secs, 0.0);
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.throughput, 0.0);
    }

    #[test]
    fn test_latency_and_hit_rate_aggregation() {
        let mut metrics = StreamMetrics::new();
        metrics.record(record(0.0, 0.1, 0.2, true, Some(0))); // latency 0.2
        metrics.record(record(1.0, 1.0, 1.6, false, Some(1))); // latency 0.6
        metrics.record(record(2.0, 2.0, 2.4, true, Some(0))); // latency 0.4

        let summary = metrics.summarize();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.hits, 2);
        assert_eq!(summary.model_invocations, 1);
        assert!((summary.mean_latency_secs - 0.4).abs() < 1e-9);
        assert!((summary.max_latency_secs - 0.6).abs() < 1e-9);
        assert!((summary.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_uses_busy_time_not_wall_clock() {
        let mut metrics = StreamMetrics::new();
        // Two items far apart in wall clock but each busy for 0.5s
        metrics.record(record(0.0, 0.0, 0.5, true, Some(0)));
        metrics.record(record(100.0, 100.0, 100.5, true, Some(0)));

        let summary = metrics.summarize();
        assert!((summary.throughput - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_items_are_counted() {
        let mut metrics = StreamMetrics::new();
        metrics.record(record(0.0, 0.0, 0.1, false, None));
        metrics.record(record(0.0, 0.1, 0.2, false, Some(0)));

        let summary = metrics.summarize();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.model_invocations, 2);
    }

    #[test]
    fn test_token_tally() {
        let mut metrics = StreamMetrics::new();
        metrics.add_tokens(120);
        metrics.add_tokens(80);
        assert_eq!(metrics.summarize().tokens_consumed, 200);
    }
}
