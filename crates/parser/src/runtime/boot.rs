//! Boot — logging init, config load, dataset read, cache seeding.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::{VarCache, VarVocabulary};
use crate::client::{FakeModel, LiveModel, ModelOps};
use crate::conf::ParserConfig;
use crate::data;

/// Everything the streaming phase needs, built during the single-threaded
/// seeding phase.
pub struct RunState {
    pub cache: Arc<VarCache>,
    pub model: Arc<dyn ModelOps>,
    pub logs: Vec<String>,
}

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parser=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load config, seed the vocabulary from labeled samples, build the
/// cache and the model client, and read the log stream.
///
/// Any seeding failure (missing files, empty or malformed sample set)
/// aborts the run before a single item is processed.
pub fn boot() -> Result<(RunState, ParserConfig), Box<dyn std::error::Error>> {
    info!("Starting streaming template parser v0.0.1");

    let config = ParserConfig::load()?;
    config.validate()?;
    info!(
        "Loaded configuration: dataset={}, interval={}ms, queue={}",
        config.dataset, config.arrival_interval_ms, config.queue_capacity
    );

    let samples = data::load::read_samples(&config.samples_path())?;
    let vocab = VarVocabulary::extract(&samples)?;
    info!(
        "Seeded vocabulary: {} categories from {} labeled samples",
        vocab.len(),
        samples.len()
    );
    let cache = Arc::new(VarCache::new(vocab));

    let model: Arc<dyn ModelOps> = if config.model.offline {
        info!("Offline mode: using the deterministic built-in model");
        Arc::new(FakeModel::new())
    } else {
        info!(
            "Fallback model: {} via {}",
            config.model.model, config.model.endpoint
        );
        Arc::new(LiveModel::new(&config.model)?)
    };

    let logs = data::load::read_logs(&config.logs_path())?;
    info!(
        "Loaded {} log lines from {}",
        logs.len(),
        config.logs_path().display()
    );

    Ok((RunState { cache, model, logs }, config))
}
