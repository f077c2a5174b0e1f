//! Store — the shared template cache consulted by every pipeline stage.
//!
//! Matching and context selection take a read lock only, so they may run
//! from concurrent consumers. Commits serialize through a dedicated mutex
//! around the check-subsume-then-append critical section, which keeps
//! indices dense, gap-free, and duplicate-free even if more consumers are
//! added later.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use super::commit;
use super::matcher;
use super::model::{fingerprint_of, MatchOutcome, PromptContext, ReferenceContext, Template};
use super::select;
use super::vocab::VarVocabulary;

pub struct VarCache {
    vocab: VarVocabulary,
    templates: RwLock<Vec<Arc<Template>>>,
    commit_lock: Mutex<()>,
}

impl VarCache {
    /// Wrap a seeded vocabulary into an empty cache.
    pub fn new(vocab: VarVocabulary) -> Self {
        Self {
            vocab,
            templates: RwLock::new(Vec::new()),
            commit_lock: Mutex::new(()),
        }
    }

    pub fn vocabulary(&self) -> &VarVocabulary {
        &self.vocab
    }

    pub fn template_count(&self) -> usize {
        self.read_templates().len()
    }

    /// Look up a committed template by its index.
    pub fn template(&self, index: usize) -> Option<Arc<Template>> {
        self.read_templates().get(index).cloned()
    }

    /// Match a line against the committed templates.
    ///
    /// Read-only and idempotent between commits; observes the latest
    /// committed state.
    pub fn match_line(&self, line: &str) -> Option<MatchOutcome> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }
        let templates = self.read_templates();
        matcher::best_match(&tokens, &templates, &self.vocab)
    }

    /// Bounded vocabulary context for a fallback call. Pure read.
    pub fn select_prompt(&self, line: &str) -> PromptContext {
        select::select_prompt(line, &self.vocab)
    }

    /// Structurally similar committed templates for a fallback call.
    /// Pure read.
    pub fn select_reference(&self, line: &str) -> ReferenceContext {
        let templates = self.read_templates();
        select::select_reference(line, &templates)
    }

    /// Turn a model response into a committed template and return its
    /// index.
    ///
    /// Structurally equivalent candidates dedup to the existing index. A
    /// response with no usable skeleton falls back to committing the raw
    /// line as an all-literal template, so one bad response never stalls
    /// the stream.
    pub fn commit(&self, line: &str, response: &str) -> usize {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let tokens = match commit::candidate_tokens(response) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("unusable model response ({err}), committing literal line: {line:?}");
                commit::literal_tokens(line)
            }
        };
        let fingerprint = fingerprint_of(&tokens);

        let mut templates = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = templates.iter().rev().find(|t| t.fingerprint() == fingerprint) {
            debug!(
                "candidate subsumed by template {}: {}",
                existing.index, existing.skeleton
            );
            return existing.index;
        }

        let index = templates.len();
        match Template::from_tokens(index, tokens) {
            Ok(template) => {
                debug!("committed template {}: {}", index, template.skeleton);
                templates.push(Arc::new(template));
                index
            }
            Err(_) => {
                // Only reachable for a whitespace-only line; record it as a
                // degenerate single-token template rather than losing the
                // dense index.
                let template = Template::parse(index, "<*>").expect("wildcard skeleton parses");
                warn!("empty line committed as wildcard template {}", index);
                templates.push(Arc::new(template));
                index
            }
        }
    }

    fn read_templates(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<Template>>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }
}
