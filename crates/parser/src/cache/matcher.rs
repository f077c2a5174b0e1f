//! Matcher — aligns a log line against committed template skeletons.
//!
//! Pure read-only helpers; the shared-state surface lives in
//! [`super::store::VarCache`]. A line matches a template when the token
//! counts agree, every literal token aligns exactly, and every variable
//! slot's token is recognized by the vocabulary. Among matching templates
//! the most specific wins (fewest variable slots); ties break to the most
//! recently committed.

use std::sync::Arc;

use super::model::{MatchOutcome, Template, TemplateToken};
use super::vocab::VarVocabulary;

/// Try to align `line_tokens` against one template.
///
/// Returns the variable bindings on success, `None` on any mismatch.
pub(crate) fn align(
    line_tokens: &[&str],
    template: &Template,
    vocab: &VarVocabulary,
) -> Option<Vec<(String, String)>> {
    if line_tokens.len() != template.tokens.len() {
        return None;
    }

    let mut bindings = Vec::new();
    for (token, slot) in line_tokens.iter().zip(&template.tokens) {
        match slot {
            TemplateToken::Literal(lit) => {
                if lit != token {
                    return None;
                }
            }
            TemplateToken::Variable(category) => {
                if !vocab.recognizes(category, token) {
                    return None;
                }
                bindings.push((category.clone(), token.to_string()));
            }
        }
    }
    Some(bindings)
}

/// Pick the best match for a line across all committed templates.
///
/// Iterates newest-first so that equal-specificity candidates resolve to
/// the most recent commit.
pub(crate) fn best_match(
    line_tokens: &[&str],
    templates: &[Arc<Template>],
    vocab: &VarVocabulary,
) -> Option<MatchOutcome> {
    let mut best: Option<(usize, MatchOutcome)> = None;

    for template in templates.iter().rev() {
        if let Some(bindings) = align(line_tokens, template, vocab) {
            let slots = template.variable_slots();
            let improves = match &best {
                None => true,
                Some((best_slots, _)) => slots < *best_slots,
            };
            if improves {
                best = Some((
                    slots,
                    MatchOutcome {
                        index: template.index,
                        bindings,
                    },
                ));
            }
        }
    }

    best.map(|(_, outcome)| outcome)
}
