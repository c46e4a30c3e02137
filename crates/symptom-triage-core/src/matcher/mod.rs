//! Symptom matcher: resolves user mentions to catalog entries.
//!
//! Two modes:
//! - explicit list: each token must equal an entry after normalization
//! - free text: an entry is present iff it occurs as a substring of the
//!   normalized utterance
//!
//! Free-text matching is deliberately coarse. It over-matches entries
//! embedded in longer words and misses synonyms and typos.

mod normalizer;
mod suggest;

pub use normalizer::*;
pub use suggest::*;

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::models::{Catalog, MatchOutcome, SymptomId, SymptomInput, UnmatchedSymptom};

/// Default minimum similarity for unmatched-token suggestions.
pub const DEFAULT_SUGGESTION_MIN_SIMILARITY: f64 = 0.85;

/// Matches symptom mentions against a catalog. Pure; holds no state.
pub struct SymptomMatcher<'a> {
    catalog: &'a Catalog,
    suggestion_min_similarity: f64,
}

impl<'a> SymptomMatcher<'a> {
    /// Create a matcher with the default suggestion threshold.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            suggestion_min_similarity: DEFAULT_SUGGESTION_MIN_SIMILARITY,
        }
    }

    /// Override the similarity a suggestion must reach.
    pub fn with_suggestion_threshold(mut self, min_similarity: f64) -> Self {
        self.suggestion_min_similarity = min_similarity;
        self
    }

    /// Match either input mode.
    pub fn match_input(&self, input: &SymptomInput) -> MatchOutcome {
        match input {
            SymptomInput::List(tokens) => self.match_list(tokens),
            SymptomInput::Text(text) => self.match_text(text),
        }
    }

    /// Explicit-list mode.
    pub fn match_list<S: AsRef<str>>(&self, tokens: &[S]) -> MatchOutcome {
        let mut found = BTreeSet::new();
        let mut unmatched = Vec::new();

        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            match self.catalog.position(&SymptomId::new(token)) {
                Some(position) => {
                    found.insert(position);
                }
                None => {
                    warn!(token, "symptom not found in catalog");
                    unmatched.push(UnmatchedSymptom {
                        token: token.to_string(),
                        suggestion: closest_entry(
                            token,
                            self.catalog,
                            self.suggestion_min_similarity,
                        ),
                    });
                }
            }
        }

        let outcome = MatchOutcome {
            recognized: self.in_catalog_order(found),
            unmatched,
        };
        debug!(
            recognized = outcome.recognized.len(),
            unmatched = outcome.unmatched.len(),
            "matched symptom list"
        );
        outcome
    }

    /// Free-text mode.
    pub fn match_text(&self, text: &str) -> MatchOutcome {
        let utterance = normalize_symptom(text);

        let recognized: Vec<SymptomId> = self
            .catalog
            .iter()
            .filter(|entry| utterance.contains(entry.as_str()))
            .cloned()
            .collect();

        let unmatched = split_fragments(text)
            .into_iter()
            .filter(|fragment| {
                let folded = normalize_symptom(fragment);
                !recognized.iter().any(|id| folded.contains(id.as_str()))
            })
            .map(|fragment| UnmatchedSymptom {
                token: fragment,
                suggestion: None,
            })
            .collect();

        let outcome = MatchOutcome {
            recognized,
            unmatched,
        };
        debug!(
            recognized = outcome.recognized.len(),
            unmatched = outcome.unmatched.len(),
            "matched free text"
        );
        outcome
    }

    fn in_catalog_order(&self, positions: BTreeSet<usize>) -> Vec<SymptomId> {
        positions
            .into_iter()
            .filter_map(|i| self.catalog.entries().get(i).cloned())
            .collect()
    }
}
