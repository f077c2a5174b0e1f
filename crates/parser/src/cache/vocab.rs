//! Variable vocabulary — seeded once from labeled samples, read-only after.
//!
//! Each category keeps its observed exemplar values plus generalized
//! descriptors derived from them, so the matcher can recognize unseen
//! values of the same shape (`42` seeds a numeric descriptor that also
//! accepts `17`).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use regex::Regex;

use super::model::{CacheError, LabeledSample, TemplateToken};

/// Exemplars and derived descriptors for one variable category.
#[derive(Debug)]
pub struct VocabEntry {
    pub category: String,
    pub exemplars: BTreeSet<String>,
    descriptors: Vec<Descriptor>,
}

#[derive(Debug)]
struct Descriptor {
    shape: &'static str,
    pattern: Regex,
}

impl VocabEntry {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            exemplars: BTreeSet::new(),
            descriptors: Vec::new(),
        }
    }

    fn admit(&mut self, value: &str) {
        if !self.exemplars.insert(value.to_string()) {
            return;
        }
        if let Some((shape, pattern)) = describe(value) {
            if !self.descriptors.iter().any(|d| d.shape == shape) {
                self.descriptors.push(Descriptor { shape, pattern });
            }
        }
    }

    /// Whether this category accepts `token` as a variable value.
    pub fn recognizes(&self, token: &str) -> bool {
        self.exemplars.contains(token) || self.descriptors.iter().any(|d| d.pattern.is_match(token))
    }

    /// How many of the line's tokens this entry recognizes.
    pub fn relevance(&self, tokens: &[&str]) -> usize {
        tokens.iter().filter(|t| self.recognizes(t)).count()
    }
}

/// Generalize an exemplar into a character-class descriptor.
///
/// Returns `None` for values with no obvious shape; those stay
/// exemplar-only.
fn describe(value: &str) -> Option<(&'static str, Regex)> {
    let compiled = |shape: &'static str, pattern: &str| {
        Regex::new(pattern).ok().map(|re| (shape, re))
    };

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return compiled("integer", r"^[0-9]+$");
    }
    if value.parse::<f64>().is_ok() && value.contains('.') {
        return compiled("decimal", r"^-?[0-9]+\.[0-9]+$");
    }
    if is_dotted_quad(value) {
        return compiled("address", r"^[0-9]{1,3}(\.[0-9]{1,3}){3}(:[0-9]+)?$");
    }
    if value.len() >= 4
        && value.bytes().all(|b| b.is_ascii_hexdigit())
        && value.bytes().any(|b| b.is_ascii_alphabetic())
    {
        return compiled("hex", r"^[0-9a-fA-F]{4,}$");
    }
    if value.contains('/') && value.bytes().all(|b| b.is_ascii_graphic()) {
        return compiled("path", r"^[A-Za-z0-9_.~:/-]+$");
    }
    None
}

fn is_dotted_quad(value: &str) -> bool {
    // Optional :port suffix
    let host = match value.split_once(':') {
        Some((h, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => h,
        Some(_) => return false,
        None => value,
    };
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.bytes().all(|b| b.is_ascii_digit()))
}

/// Categorized variable exemplars built once by the seeding phase.
///
/// Never mutated after [`VarVocabulary::extract`] returns.
#[derive(Debug, Default)]
pub struct VarVocabulary {
    entries: BTreeMap<String, VocabEntry>,
}

impl VarVocabulary {
    /// Seed the vocabulary from `(line, labeled template)` pairs.
    ///
    /// Fails the whole startup on an empty set, on any pair whose token
    /// counts disagree, or when no pair contributes a variable slot.
    /// There is no partial-seed mode.
    pub fn extract(samples: &[LabeledSample]) -> Result<Self, CacheError> {
        if samples.is_empty() {
            return Err(CacheError::EmptySamples);
        }

        let mut entries: BTreeMap<String, VocabEntry> = BTreeMap::new();
        let mut slots_seen = 0usize;

        for (row, sample) in samples.iter().enumerate() {
            let line_tokens: Vec<&str> = sample.content.split_whitespace().collect();
            let template_tokens: Vec<TemplateToken> = sample
                .template
                .split_whitespace()
                .map(TemplateToken::parse)
                .collect();

            if line_tokens.is_empty() || line_tokens.len() != template_tokens.len() {
                return Err(CacheError::MalformedSample(row));
            }

            for (value, slot) in line_tokens.iter().zip(&template_tokens) {
                if let TemplateToken::Variable(category) = slot {
                    slots_seen += 1;
                    entries
                        .entry(category.clone())
                        .or_insert_with(|| VocabEntry::new(category))
                        .admit(value);
                }
            }
        }

        if slots_seen == 0 {
            return Err(CacheError::NoVariables);
        }

        Ok(Self { entries })
    }

    /// Whether `token` is an acceptable value for the given slot category.
    ///
    /// The generic `<*>` slot and categories the seeding phase never saw
    /// accept any token — the matcher treats them as plain wildcards.
    pub fn recognizes(&self, category: &str, token: &str) -> bool {
        if category == "*" {
            return true;
        }
        match self.entries.get(category) {
            Some(entry) => entry.recognizes(token),
            None => true,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
