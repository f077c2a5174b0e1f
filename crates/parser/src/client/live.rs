//! Live — HTTP implementation of [`ModelOps`].
//!
//! Speaks the OpenAI-compatible chat-completions wire format, so any
//! hosted or local endpoint exposing that surface can serve as the
//! fallback model. Requests are timeout-bounded; a timed-out call
//! surfaces as [`ModelError::Timeout`] and is handled by the pipeline's
//! failure policy.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::cache::{PromptContext, ReferenceContext};
use crate::conf::ModelConfig;

use super::error::ModelError;
use super::model::{ModelOps, ModelReply};

const SYSTEM_PROMPT: &str = "You are a log parsing assistant. Given a raw log line, \
known variable categories with example values, and reference templates, answer with \
the log template only: keep literal tokens unchanged and replace each variable token \
with its category name in angle brackets.";

pub struct LiveModel {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl LiveModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ModelError::MissingApiKey(config.api_key_env.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Render the user message for one fallback query.
    fn build_prompt(line: &str, prompt: &PromptContext, reference: &ReferenceContext) -> String {
        let mut out = String::new();

        if !prompt.entries.is_empty() {
            out.push_str("Known variable categories:\n");
            for entry in &prompt.entries {
                let _ = writeln!(
                    out,
                    "  <{}> e.g. {}",
                    entry.category,
                    entry.exemplars.join(", ")
                );
            }
        }

        if !reference.skeletons.is_empty() {
            out.push_str("Reference templates:\n");
            for skeleton in &reference.skeletons {
                let _ = writeln!(out, "  {}", skeleton);
            }
        }

        let _ = write!(out, "Log line: {}", line);
        out
    }
}

#[async_trait]
impl ModelOps for LiveModel {
    async fn invoke(
        &self,
        line: &str,
        prompt: &PromptContext,
        reference: &ReferenceContext,
    ) -> Result<ModelReply, ModelError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::build_prompt(line, prompt, reference) },
            ],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::BadStatus(status.as_u16()));
        }

        let payload: ChatResponse = response.json().await?;
        let tokens = payload.usage.map(|u| u.total_tokens).unwrap_or(0);
        let text = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        debug!("model answered {:?} ({} tokens)", text, tokens);
        Ok(ModelReply { text, tokens })
    }
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}
