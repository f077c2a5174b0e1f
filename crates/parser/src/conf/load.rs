//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{ModelConfig, ModelFailurePolicy, ParserConfig};

impl ParserConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path =
            std::env::var("PARSER_CONFIG_FILE").unwrap_or_else(|_| "parser.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "Config file not found at {}, using environment variables",
                config_path
            );
            Self::from_env()
        };

        // Environment variables override file config for critical settings
        if let Ok(dataset) = std::env::var("PARSER_DATASET") {
            config.dataset = dataset;
        }
        if let Ok(dir) = std::env::var("PARSER_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Ok(dir) = std::env::var("PARSER_OUTPUT_DIR") {
            config.output_dir = dir;
        }
        if let Ok(offline) = std::env::var("PARSER_MODEL_OFFLINE") {
            if let Ok(offline) = offline.parse() {
                config.model.offline = offline;
            }
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: ParserConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dataset: std::env::var("PARSER_DATASET").unwrap_or(defaults.dataset),
            data_dir: std::env::var("PARSER_DATA_DIR").unwrap_or(defaults.data_dir),
            output_dir: std::env::var("PARSER_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            arrival_interval_ms: std::env::var("PARSER_ARRIVAL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.arrival_interval_ms),
            queue_capacity: std::env::var("PARSER_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            on_model_failure: std::env::var("PARSER_ON_MODEL_FAILURE")
                .ok()
                .and_then(|s| match s.as_str() {
                    "skip" => Some(ModelFailurePolicy::Skip),
                    "abort" => Some(ModelFailurePolicy::Abort),
                    _ => None,
                })
                .unwrap_or(defaults.on_model_failure),
            model: ModelConfig::from_env(),
        }
    }

    /// Validate configuration values before the run starts
    pub fn validate(&self) -> Result<(), String> {
        if self.dataset.is_empty() {
            return Err("dataset must not be empty".to_string());
        }
        if self.data_dir.is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be > 0".to_string());
        }
        self.model.validate()?;
        Ok(())
    }
}

impl ModelConfig {
    /// Load model configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("PARSER_MODEL_ENDPOINT").unwrap_or(defaults.endpoint),
            model: std::env::var("PARSER_MODEL_NAME").unwrap_or(defaults.model),
            api_key_env: std::env::var("PARSER_MODEL_API_KEY_ENV").unwrap_or(defaults.api_key_env),
            request_timeout_secs: std::env::var("PARSER_MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            offline: std::env::var("PARSER_MODEL_OFFLINE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.offline),
        }
    }

    /// Validate model configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.offline {
            return Ok(());
        }
        if self.endpoint.is_empty() {
            return Err("model.endpoint must not be empty".to_string());
        }
        if self.model.is_empty() {
            return Err("model.model must not be empty".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("model.request_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_partial_overrides() {
        let raw = r#"
            dataset = "Hadoop"
            arrival_interval_ms = 0
            queue_capacity = 1

            [model]
            offline = true
        "#;
        let config: ParserConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.dataset, "Hadoop");
        assert_eq!(config.arrival_interval_ms, 0);
        assert_eq!(config.queue_capacity, 1);
        assert!(config.model.offline);
        // Untouched fields keep their defaults
        assert_eq!(config.output_dir, "parsed");
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = ParserConfig::default();
        config.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout_online() {
        let mut config = ParserConfig::default();
        config.model.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        // Offline mode never touches the endpoint, so the same value passes
        config.model.offline = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_zero_pacing() {
        let mut config = ParserConfig::default();
        config.arrival_interval_ms = 0;
        config.model.offline = true;
        assert!(config.validate().is_ok());
    }
}
