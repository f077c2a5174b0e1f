//! Run — drive the pipeline to completion and export results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::conf::ParserConfig;
use crate::data::report;
use crate::stream::StreamPipeline;

use super::boot::RunState;

/// Stream the whole input through the cache, then write the metrics,
/// parsed, and summary exports and log the aggregate statistics.
pub async fn run(state: RunState, config: ParserConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = StreamPipeline::new(Arc::clone(&state.cache), Arc::clone(&state.model), &config);

    // Keep the input around for the parsed export; records align 1:1.
    let lines = state.logs.clone();
    info!("Streaming {} lines", lines.len());

    let outcome = pipeline.run(state.logs).await?;
    let summary = &outcome.summary;

    report::write_metrics(&config.metrics_path(), outcome.metrics.records())?;
    report::write_parsed(
        &config.parsed_path(),
        &lines,
        outcome.metrics.records(),
        &state.cache,
    )?;
    report::write_summary(&config.summary_path(), &config.dataset, summary)?;

    info!("Dataset: {}", config.dataset);
    info!("Avg latency: {:.2} ms", summary.mean_latency_secs * 1000.0);
    info!("Max latency: {:.2} ms", summary.max_latency_secs * 1000.0);
    info!("Cache hit rate: {:.4}", summary.hit_rate);
    info!("Throughput: {:.2} logs/sec", summary.throughput);
    info!(
        "Model invocations: {} ({} tokens)",
        summary.model_invocations, summary.tokens_consumed
    );
    info!("Templates learned: {}", state.cache.template_count());
    if summary.failed > 0 {
        warn!(
            "{} lines failed the fallback call and were recorded unparsed",
            summary.failed
        );
    }
    info!("Metrics saved to: {}", config.metrics_path().display());

    Ok(())
}
