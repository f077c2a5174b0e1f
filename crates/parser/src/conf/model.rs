//! Model — ParserConfig and related structs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Dataset name; resolves the sample and log file names under
    /// `data_dir`.
    pub dataset: String,
    pub data_dir: String,
    pub output_dir: String,
    /// Pacing delay between successive producer enqueues. Zero is valid
    /// (back-to-back arrivals).
    pub arrival_interval_ms: u64,
    /// Max in-flight unprocessed items; the producer blocks when full.
    pub queue_capacity: usize,
    /// What a failed model call does to the run: skip the item or abort.
    pub on_model_failure: ModelFailurePolicy,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFailurePolicy {
    /// Record the item as failed and keep consuming.
    Skip,
    /// End the whole run on the first failed call.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    /// Use the deterministic built-in model instead of the endpoint.
    pub offline: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            dataset: "Apache".to_string(),
            data_dir: "data".to_string(),
            output_dir: "parsed".to_string(),
            arrival_interval_ms: 10,
            queue_capacity: 10_000,
            on_model_failure: ModelFailurePolicy::Skip,
            model: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 30,
            offline: false,
        }
    }
}

impl ParserConfig {
    /// Labeled seeding examples: `{data_dir}/{dataset}_sampled_examples.csv`
    pub fn samples_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}_sampled_examples.csv", self.dataset))
    }

    /// Raw log stream: `{data_dir}/{dataset}.csv`
    pub fn logs_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}.csv", self.dataset))
    }

    /// Per-item metrics export: `{output_dir}/stream_{dataset}.csv`
    pub fn metrics_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(format!("stream_{}.csv", self.dataset))
    }

    /// Parsed line/template export: `{output_dir}/{dataset}_parsed.csv`
    pub fn parsed_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(format!("{}_parsed.csv", self.dataset))
    }

    /// Aggregate statistics export: `{output_dir}/{dataset}_summary.csv`
    pub fn summary_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(format!("{}_summary.csv", self.dataset))
    }
}
