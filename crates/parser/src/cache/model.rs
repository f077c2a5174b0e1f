use serde::Serialize;
use thiserror::Error;

/// One aligned position in a template skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateToken {
    /// Literal token that must equal the log token at its position.
    Literal(String),
    /// Variable slot carrying its category name (`<ID>` → `ID`, `<*>` → `*`).
    Variable(String),
}

impl TemplateToken {
    /// Parse a single whitespace-delimited skeleton token.
    pub fn parse(raw: &str) -> Self {
        if raw.len() > 2 && raw.starts_with('<') && raw.ends_with('>') {
            TemplateToken::Variable(raw[1..raw.len() - 1].to_string())
        } else {
            TemplateToken::Literal(raw.to_string())
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TemplateToken::Variable(_))
    }
}

impl std::fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateToken::Literal(s) => f.write_str(s),
            TemplateToken::Variable(c) => write!(f, "<{}>", c),
        }
    }
}

/// A committed log-line skeleton with variable positions abstracted out.
///
/// Created only by the committer; immutable afterwards. The index is
/// assigned on first commit and never reused or reassigned.
#[derive(Debug, Clone)]
pub struct Template {
    pub index: usize,
    /// Canonical skeleton string (tokens joined by single spaces).
    pub skeleton: String,
    pub tokens: Vec<TemplateToken>,
    /// Structural signature: every variable slot collapsed to one wildcard.
    /// Two templates are structurally equivalent iff fingerprints are equal.
    fingerprint: String,
}

impl Template {
    /// Build a template from already-parsed tokens.
    pub fn from_tokens(index: usize, tokens: Vec<TemplateToken>) -> Result<Self, CacheError> {
        if tokens.is_empty() {
            return Err(CacheError::EmptySkeleton);
        }
        let skeleton = tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let fingerprint = fingerprint_of(&tokens);
        Ok(Self { index, skeleton, tokens, fingerprint })
    }

    /// Parse a skeleton string like `"User <ID> logged in"`.
    pub fn parse(index: usize, skeleton: &str) -> Result<Self, CacheError> {
        let tokens: Vec<TemplateToken> =
            skeleton.split_whitespace().map(TemplateToken::parse).collect();
        Self::from_tokens(index, tokens)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn variable_slots(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_variable()).count()
    }
}

/// Structural signature of a token sequence (variables collapsed to `<*>`).
pub(crate) fn fingerprint_of(tokens: &[TemplateToken]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            TemplateToken::Literal(s) => s.as_str(),
            TemplateToken::Variable(_) => "<*>",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A successful cache match: which template, and what each slot bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub index: usize,
    /// `(category, value)` per variable slot, in skeleton order.
    pub bindings: Vec<(String, String)>,
}

/// One labeled seeding example: a raw line and its known template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSample {
    pub content: String,
    pub template: String,
}

/// Bounded vocabulary excerpt sent with a fallback model call.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub entries: Vec<PromptVar>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptVar {
    pub category: String,
    pub exemplars: Vec<String>,
}

/// Small set of committed skeletons anchoring the model's output format.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceContext {
    pub skeletons: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("sample set is empty")]
    EmptySamples,

    #[error("sample {0} does not align with its labeled template")]
    MalformedSample(usize),

    #[error("sample set yields no variable slots")]
    NoVariables,

    #[error("no usable skeleton tokens")]
    EmptySkeleton,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parse_literal_and_variable() {
        assert_eq!(
            TemplateToken::parse("logged"),
            TemplateToken::Literal("logged".to_string())
        );
        assert_eq!(
            TemplateToken::parse("<ID>"),
            TemplateToken::Variable("ID".to_string())
        );
        assert_eq!(
            TemplateToken::parse("<*>"),
            TemplateToken::Variable("*".to_string())
        );
        // Degenerate bracket pair stays literal
        assert_eq!(
            TemplateToken::parse("<>"),
            TemplateToken::Literal("<>".to_string())
        );
    }

    #[test]
    fn test_template_parse_roundtrip() {
        let t = Template::parse(0, "User  <ID>   logged in").unwrap();
        assert_eq!(t.skeleton, "User <ID> logged in");
        assert_eq!(t.tokens.len(), 4);
        assert_eq!(t.variable_slots(), 1);
    }

    #[test]
    fn test_fingerprint_ignores_category_names() {
        let a = Template::parse(0, "User <ID> logged in").unwrap();
        let b = Template::parse(1, "User <*> logged in").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = Template::parse(2, "User <ID> logged out").unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_empty_skeleton_rejected() {
        assert!(matches!(
            Template::parse(0, "   "),
            Err(CacheError::EmptySkeleton)
        ));
    }
}
