//! Pipeline — paced producer and FIFO consumer over a bounded queue.
//!
//! Per-item state machine:
//! `Queued → Dequeued → (Matched | Missed) → [Missed: Selected →
//! ModelInvoked → Committed] → Recorded`. There is no retry state; a
//! failed model call is handled by the configured policy, never by
//! re-queueing.
//!
//! The producer's bounded send plus its pacing sleep are the only
//! load-shaping mechanisms; no item is ever dropped under backpressure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::cache::VarCache;
use crate::client::{ModelError, ModelOps};
use crate::conf::{ModelFailurePolicy, ParserConfig};

use super::item::{LogItem, MetricsRecord};
use super::metrics::{RunSummary, StreamMetrics};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("model invocation failed for {line:?}: {source}")]
    ModelFailure { line: String, source: ModelError },

    #[error("pipeline task terminated abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything a finished run yields: the ordered records and their
/// aggregation.
#[derive(Debug)]
pub struct RunOutcome {
    pub metrics: StreamMetrics,
    pub summary: RunSummary,
}

pub struct StreamPipeline {
    cache: Arc<VarCache>,
    model: Arc<dyn ModelOps>,
    arrival_interval: Duration,
    queue_capacity: usize,
    on_model_failure: ModelFailurePolicy,
}

impl StreamPipeline {
    pub fn new(cache: Arc<VarCache>, model: Arc<dyn ModelOps>, config: &ParserConfig) -> Self {
        Self {
            cache,
            model,
            arrival_interval: Duration::from_millis(config.arrival_interval_ms),
            queue_capacity: config.queue_capacity,
            on_model_failure: config.on_model_failure,
        }
    }

    /// Stream every line through the cache once and collect the metrics.
    ///
    /// Records are in arrival order, one per input line (the abort policy
    /// cuts the run short instead).
    pub async fn run(&self, logs: Vec<String>) -> Result<RunOutcome, PipelineError> {
        let origin = Instant::now();
        let (tx, rx) = mpsc::channel::<LogItem>(self.queue_capacity.max(1));

        let interval = self.arrival_interval;
        let producer = tokio::spawn(async move {
            for line in logs {
                let item = LogItem {
                    line,
                    arrival: Instant::now(),
                };
                // Blocks while the queue is full; a closed channel means
                // the consumer aborted and there is nobody left to feed.
                if tx.send(item).await.is_err() {
                    break;
                }
                if !interval.is_zero() {
                    sleep(interval).await;
                }
            }
        });

        let consumer = {
            let cache = Arc::clone(&self.cache);
            let model = Arc::clone(&self.model);
            let policy = self.on_model_failure;
            tokio::spawn(async move {
                consume(rx, cache, model, policy, origin).await
            })
        };

        producer.await?;
        let metrics = consumer.await??;
        let summary = metrics.summarize();
        debug!(
            "pipeline drained: {} items, hit rate {:.4}",
            summary.total, summary.hit_rate
        );
        Ok(RunOutcome { metrics, summary })
    }
}

/// Single consumer: strict FIFO, one record per dequeued item.
async fn consume(
    mut rx: mpsc::Receiver<LogItem>,
    cache: Arc<VarCache>,
    model: Arc<dyn ModelOps>,
    policy: ModelFailurePolicy,
    origin: Instant,
) -> Result<StreamMetrics, PipelineError> {
    let mut metrics = StreamMetrics::new();

    while let Some(item) = rx.recv().await {
        let start = Instant::now();

        let matched = cache.match_line(&item.line);
        let cache_hit = matched.is_some();
        let mut model_invoked = false;

        let template_index = match matched {
            Some(outcome) => Some(outcome.index),
            None => {
                model_invoked = true;
                let prompt = cache.select_prompt(&item.line);
                let reference = cache.select_reference(&item.line);
                match model.invoke(&item.line, &prompt, &reference).await {
                    Ok(reply) => {
                        metrics.add_tokens(reply.tokens);
                        Some(cache.commit(&item.line, &reply.text))
                    }
                    Err(source) => match policy {
                        ModelFailurePolicy::Skip => {
                            warn!("skipping {:?}: model call failed: {}", item.line, source);
                            None
                        }
                        ModelFailurePolicy::Abort => {
                            return Err(PipelineError::ModelFailure {
                                line: item.line,
                                source,
                            });
                        }
                    },
                }
            }
        };

        let end = Instant::now();
        let arrival_secs = item.arrival.duration_since(origin).as_secs_f64();
        let end_secs = end.duration_since(origin).as_secs_f64();
        metrics.record(MetricsRecord {
            arrival_secs,
            start_secs: start.duration_since(origin).as_secs_f64(),
            end_secs,
            // Queue wait included by definition
            latency_secs: end_secs - arrival_secs,
            cache_hit,
            model_invoked,
            template_index,
        });
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{LabeledSample, VarVocabulary};
    use crate::client::FakeModel;

    fn seeded_cache() -> Arc<VarCache> {
        let vocab = VarVocabulary::extract(&[LabeledSample {
            content: "User 42 logged in".to_string(),
            template: "User <ID> logged in".to_string(),
        }])
        .unwrap();
        Arc::new(VarCache::new(vocab))
    }

    fn config(queue_capacity: usize, policy: ModelFailurePolicy) -> ParserConfig {
        let mut config = ParserConfig::default();
        config.arrival_interval_ms = 0;
        config.queue_capacity = queue_capacity;
        config.on_model_failure = policy;
        config
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_miss_then_hits_on_repeats() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::new());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model.clone(),
            &config(16, ModelFailurePolicy::Skip),
        );

        let outcome = pipeline
            .run(lines(&[
                "User 1 logged in",
                "User 2 logged in",
                "User 3 logged in",
            ]))
            .await
            .unwrap();

        // First line misses and commits "User <*> logged in"; the rest hit.
        assert_eq!(outcome.summary.total, 3);
        assert_eq!(outcome.summary.hits, 2);
        assert_eq!(outcome.summary.model_invocations, 1);
        assert_eq!(model.invocations(), 1);
        assert_eq!(cache.template_count(), 1);
        assert!((outcome.summary.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_capacity_one_processes_all_in_order() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::new());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(1, ModelFailurePolicy::Skip),
        );

        // Zero pacing delay: the producer blocks on the second enqueue
        // until the consumer drains the first.
        let outcome = pipeline
            .run(lines(&["Connection refused", "Connection refused"]))
            .await
            .unwrap();

        assert_eq!(outcome.summary.total, 2);
        let records = outcome.metrics.records();
        assert!(!records[0].cache_hit);
        assert!(records[1].cache_hit);
        assert_eq!(records[1].template_index, Some(0));
    }

    #[tokio::test]
    async fn test_fifo_processing_order() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::new());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(4, ModelFailurePolicy::Skip),
        );

        let outcome = pipeline
            .run(lines(&["a b c", "d e f", "g h i", "j k l"]))
            .await
            .unwrap();

        let records = outcome.metrics.records();
        assert_eq!(records.len(), 4);
        for pair in records.windows(2) {
            assert!(pair[0].start_secs <= pair[1].start_secs);
            assert!(pair[0].arrival_secs <= pair[1].arrival_secs);
        }
    }

    #[tokio::test]
    async fn test_latency_is_end_minus_arrival() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::new());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(8, ModelFailurePolicy::Skip),
        );

        let outcome = pipeline
            .run(lines(&["User 5 logged in", "User 6 logged in"]))
            .await
            .unwrap();

        for record in outcome.metrics.records() {
            assert!((record.latency_secs - (record.end_secs - record.arrival_secs)).abs() < 1e-12);
            assert!(record.latency_secs >= record.processing_secs());
        }
    }

    #[tokio::test]
    async fn test_skip_policy_records_failure_and_continues() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::failing());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(8, ModelFailurePolicy::Skip),
        );

        let outcome = pipeline
            .run(lines(&["Connection refused", "Connection refused"]))
            .await
            .unwrap();

        assert_eq!(outcome.summary.total, 2);
        assert_eq!(outcome.summary.failed, 2);
        assert_eq!(cache.template_count(), 0);
        assert!(outcome
            .metrics
            .records()
            .iter()
            .all(|r| r.template_index.is_none() && r.model_invoked));
    }

    #[tokio::test]
    async fn test_abort_policy_fails_the_run() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::failing());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(8, ModelFailurePolicy::Abort),
        );

        let result = pipeline.run(lines(&["Connection refused"])).await;
        assert!(matches!(
            result,
            Err(PipelineError::ModelFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_hit_rate_with_mixed_structures() {
        let cache = seeded_cache();
        let model = Arc::new(FakeModel::new());
        let pipeline = StreamPipeline::new(
            Arc::clone(&cache),
            model,
            &config(32, ModelFailurePolicy::Skip),
        );

        // 10 lines, 2 distinct structures → 2 misses, 8 hits
        let mut input = Vec::new();
        for i in 0..5 {
            input.push(format!("User {} logged in", i));
            input.push(format!("Disk {} full", i));
        }

        let outcome = pipeline.run(input).await.unwrap();
        assert_eq!(outcome.summary.total, 10);
        assert_eq!(outcome.summary.model_invocations, 2);
        assert!((outcome.summary.hit_rate - 0.8).abs() < 1e-9);
        assert_eq!(cache.template_count(), 2);
    }
}
