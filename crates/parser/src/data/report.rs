//! Report — CSV export of per-item metrics, parsed lines, and the run
//! summary.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::VarCache;
use crate::stream::{MetricsRecord, RunSummary};

use super::load::DataError;

/// Write one row per processed item, in processing order.
pub fn write_metrics(path: &Path, records: &[MetricsRecord]) -> Result<(), DataError> {
    let mut writer = open_writer(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ParsedRow<'a> {
    content: &'a str,
    template: &'a str,
}

/// Write each input line next to the skeleton it resolved to.
///
/// Lines and records align one-to-one in arrival order; items that failed
/// the fallback call export an empty template.
pub fn write_parsed(
    path: &Path,
    lines: &[String],
    records: &[MetricsRecord],
    cache: &VarCache,
) -> Result<(), DataError> {
    let mut writer = open_writer(path)?;
    for (line, record) in lines.iter().zip(records) {
        let template = record.template_index.and_then(|index| cache.template(index));
        writer.serialize(ParsedRow {
            content: line,
            template: template.as_ref().map(|t| t.skeleton.as_str()).unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    dataset: &'a str,
    completed_at: DateTime<Utc>,
    total: usize,
    hits: usize,
    failed: usize,
    model_invocations: usize,
    tokens_consumed: u64,
    mean_latency_secs: f64,
    max_latency_secs: f64,
    hit_rate: f64,
    throughput: f64,
}

/// Write the aggregate statistics as a single stamped row.
pub fn write_summary(path: &Path, dataset: &str, summary: &RunSummary) -> Result<(), DataError> {
    let mut writer = open_writer(path)?;
    writer.serialize(SummaryRow {
        dataset,
        completed_at: Utc::now(),
        total: summary.total,
        hits: summary.hits,
        failed: summary.failed,
        model_invocations: summary.model_invocations,
        tokens_consumed: summary.tokens_consumed,
        mean_latency_secs: summary.mean_latency_secs,
        max_latency_secs: summary.max_latency_secs,
        hit_rate: summary.hit_rate,
        throughput: summary.throughput,
    })?;
    writer.flush()?;
    Ok(())
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, DataError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(csv::Writer::from_path(path)?)
}
