//! Error — failures at the fallback-model boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("api key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("model endpoint returned status {0}")]
    BadStatus(u16),

    #[error("model response contained no content")]
    EmptyResponse,
}
