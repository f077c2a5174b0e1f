//! Model trait — abstract interface for the fallback language model.
//!
//! Treated as an opaque, potentially slow, potentially failing call:
//! invoked once per cache miss, and its textual response is handed to the
//! committer.

use async_trait::async_trait;

use crate::cache::{PromptContext, ReferenceContext};

use super::error::ModelError;

/// One fallback response with its token cost.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub tokens: u32,
}

/// Unified async interface over the fallback model.
///
/// Implementations must be `Send + Sync` so they can live inside an
/// `Arc` shared with the consumer task.
#[async_trait]
pub trait ModelOps: Send + Sync {
    async fn invoke(
        &self,
        line: &str,
        prompt: &PromptContext,
        reference: &ReferenceContext,
    ) -> Result<ModelReply, ModelError>;
}
