//! Adaptive template cache.
//!
//! Turns raw log lines into structured templates by matching against a
//! learned set of skeletons before falling back to the external model.
//!
//! # Architecture
//!
//! - `model.rs`: template, vocabulary, and context types
//! - `vocab.rs`: variable vocabulary seeded once from labeled samples
//! - `matcher.rs`: skeleton alignment under vocabulary wildcards
//! - `select.rs`: adaptive prompt/reference context selection on a miss
//! - `commit.rs`: model response cleanup and candidate parsing
//! - `store.rs`: the shared `VarCache` aggregate
//!
//! # Invariants
//!
//! Template indices are dense and strictly increasing from 0; a committed
//! template is immutable; the vocabulary never changes after seeding.

pub mod model;
pub mod vocab;
pub mod matcher;
pub mod select;
pub mod commit;
pub mod store;

// Re-export commonly used types
pub use model::{
    CacheError, LabeledSample, MatchOutcome, PromptContext, PromptVar, ReferenceContext, Template,
    TemplateToken,
};
pub use store::VarCache;
pub use vocab::VarVocabulary;

// Constants
pub const MAX_PROMPT_VARS: usize = 8; // Vocabulary entries per fallback prompt
pub const MAX_EXEMPLARS_PER_VAR: usize = 5;
pub const MAX_REFERENCE_TEMPLATES: usize = 3;
