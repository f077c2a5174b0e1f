//! Selector — adaptive context for the fallback model call.
//!
//! On a cache miss only a bounded, relevance-ranked slice of the
//! vocabulary and a handful of structurally similar templates are sent
//! with the query. Sending the whole vocabulary would defeat adaptive
//! selection and inflate model latency and cost.

use std::sync::Arc;

use super::model::{PromptContext, PromptVar, ReferenceContext, Template, TemplateToken};
use super::vocab::VarVocabulary;
use super::{MAX_EXEMPLARS_PER_VAR, MAX_PROMPT_VARS, MAX_REFERENCE_TEMPLATES};

/// Rank vocabulary entries by how many of the line's tokens they
/// recognize and keep the top slice.
pub(crate) fn select_prompt(line: &str, vocab: &VarVocabulary) -> PromptContext {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let mut ranked: Vec<(usize, &str, Vec<String>)> = vocab
        .entries()
        .map(|entry| {
            let exemplars: Vec<String> = entry
                .exemplars
                .iter()
                .take(MAX_EXEMPLARS_PER_VAR)
                .cloned()
                .collect();
            (entry.relevance(&tokens), entry.category.as_str(), exemplars)
        })
        .collect();

    // Highest relevance first; category name keeps the order stable.
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    let any_relevant = ranked.first().map(|(hits, _, _)| *hits > 0).unwrap_or(false);
    let entries = ranked
        .into_iter()
        .filter(|(hits, _, _)| !any_relevant || *hits > 0)
        .take(MAX_PROMPT_VARS)
        .map(|(_, category, exemplars)| PromptVar {
            category: category.to_string(),
            exemplars,
        })
        .collect();

    PromptContext { entries }
}

/// Pick the committed templates most structurally similar to the line.
///
/// Similarity is shared-literal overlap with a penalty for token-count
/// distance; ties go to the most recent commit.
pub(crate) fn select_reference(line: &str, templates: &[Arc<Template>]) -> ReferenceContext {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let mut scored: Vec<(i64, usize, &Arc<Template>)> = templates
        .iter()
        .map(|template| {
            let shared = template
                .tokens
                .iter()
                .filter(|slot| match slot {
                    TemplateToken::Literal(lit) => tokens.contains(&lit.as_str()),
                    TemplateToken::Variable(_) => false,
                })
                .count() as i64;
            let distance = (template.tokens.len() as i64 - tokens.len() as i64).abs();
            (shared * 2 - distance, template.index, template)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    ReferenceContext {
        skeletons: scored
            .into_iter()
            .take(MAX_REFERENCE_TEMPLATES)
            .map(|(_, _, template)| template.skeleton.clone())
            .collect(),
    }
}
