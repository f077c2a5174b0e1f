//! Stream module — paced producer/consumer pipeline and its metrics.
//!
//! One producer task stamps arrivals and feeds a bounded FIFO queue at a
//! configured pacing interval; one consumer drains it in order, driving
//! match → (miss: select → model → commit) → record per item. Per-item
//! latency is measured from arrival, queue wait included.

pub mod item;
pub mod metrics;
pub mod pipeline;

pub use item::{LogItem, MetricsRecord};
pub use metrics::{RunSummary, StreamMetrics};
pub use pipeline::{PipelineError, RunOutcome, StreamPipeline};
