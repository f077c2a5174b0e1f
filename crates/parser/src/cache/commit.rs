//! Committer — model response cleanup and candidate parsing.
//!
//! The insertion path itself (subsumption re-check, dense index
//! assignment) lives in [`super::store::VarCache::commit`]; these helpers
//! turn a raw model response into candidate skeleton tokens.

use super::model::{CacheError, TemplateToken};

/// Extract the skeleton line from a model response.
///
/// Models wrap answers in code fences, quotes, or chatter; keep the first
/// non-empty payload line.
pub(crate) fn clean_response(response: &str) -> Option<String> {
    let mut lines = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"));

    let line = lines.next()?;
    let line = line
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Parse a model response into candidate skeleton tokens.
pub(crate) fn candidate_tokens(response: &str) -> Result<Vec<TemplateToken>, CacheError> {
    let line = clean_response(response).ok_or(CacheError::EmptySkeleton)?;
    let tokens: Vec<TemplateToken> = line.split_whitespace().map(TemplateToken::parse).collect();
    if tokens.is_empty() {
        return Err(CacheError::EmptySkeleton);
    }
    Ok(tokens)
}

/// All-literal fallback tokens for a line whose response was unusable.
pub(crate) fn literal_tokens(line: &str) -> Vec<TemplateToken> {
    line.split_whitespace()
        .map(|t| TemplateToken::Literal(t.to_string()))
        .collect()
}
