//! Fake — deterministic test double for the fallback model.
//!
//! Derives a template from the query line itself (tokens containing
//! digits become `<*>` slots), or returns canned responses seeded per
//! line. Used by unit tests and by offline runs where no endpoint is
//! configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cache::{PromptContext, ReferenceContext};

use super::error::ModelError;
use super::model::{ModelOps, ModelReply};

pub struct FakeModel {
    canned: Mutex<HashMap<String, String>>,
    invocations: AtomicU64,
    fail: bool,
}

impl FakeModel {
    /// A fake that derives templates heuristically.
    pub fn new() -> Self {
        Self {
            canned: Mutex::new(HashMap::new()),
            invocations: AtomicU64::new(0),
            fail: false,
        }
    }

    /// A fake whose every invocation fails, for exercising the pipeline's
    /// failure policy.
    pub fn failing() -> Self {
        Self {
            canned: Mutex::new(HashMap::new()),
            invocations: AtomicU64::new(0),
            fail: true,
        }
    }

    /// Seed an exact reply for one query line.
    pub fn with_response(self, line: &str, template: &str) -> Self {
        {
            let mut canned = self.canned.lock().unwrap_or_else(|e| e.into_inner());
            canned.insert(line.to_string(), template.to_string());
        }
        self
    }

    /// How many times `invoke` was called.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Digit-bearing tokens become wildcard slots; everything else stays
    /// literal.
    fn derive_template(line: &str) -> String {
        line.split_whitespace()
            .map(|token| {
                if token.bytes().any(|b| b.is_ascii_digit()) {
                    "<*>"
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for FakeModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelOps for FakeModel {
    async fn invoke(
        &self,
        line: &str,
        _prompt: &PromptContext,
        _reference: &ReferenceContext,
    ) -> Result<ModelReply, ModelError> {
        self.invocations.fetch_add(1, Ordering::Relaxed);

        if self.fail {
            return Err(ModelError::BadStatus(503));
        }

        let canned = self.canned.lock().unwrap_or_else(|e| e.into_inner());
        let text = canned
            .get(line)
            .cloned()
            .unwrap_or_else(|| Self::derive_template(line));

        Ok(ModelReply { text, tokens: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_context() -> (PromptContext, ReferenceContext) {
        (
            PromptContext { entries: vec![] },
            ReferenceContext { skeletons: vec![] },
        )
    }

    #[test]
    fn test_derive_template_masks_digit_tokens() {
        assert_eq!(
            FakeModel::derive_template("User 42 logged in"),
            "User <*> logged in"
        );
        assert_eq!(
            FakeModel::derive_template("Connection refused"),
            "Connection refused"
        );
    }

    #[tokio::test]
    async fn test_canned_response_wins_over_heuristic() {
        let fake = FakeModel::new().with_response("User 42 logged in", "User <ID> logged in");
        let (prompt, reference) = empty_context();
        let reply = fake
            .invoke("User 42 logged in", &prompt, &reference)
            .await
            .unwrap();
        assert_eq!(reply.text, "User <ID> logged in");
        assert_eq!(fake.invocations(), 1);
    }

    #[tokio::test]
    async fn test_failing_fake_errors() {
        let fake = FakeModel::failing();
        let (prompt, reference) = empty_context();
        let result = fake.invoke("anything 1", &prompt, &reference).await;
        assert!(matches!(result, Err(ModelError::BadStatus(503))));
    }
}
