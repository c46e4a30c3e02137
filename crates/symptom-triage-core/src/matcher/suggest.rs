//! Closest-entry suggestions for unmatched tokens.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::{Catalog, SymptomId};

/// Suggest the catalog entry most similar to `token`.
///
/// Returns `None` when nothing reaches `min_similarity`. Ties go to the
/// earliest catalog entry.
pub fn closest_entry(token: &str, catalog: &Catalog, min_similarity: f64) -> Option<SymptomId> {
    let query = SymptomId::new(token);
    if query.as_str().is_empty() {
        return None;
    }

    let mut best: Option<(&SymptomId, f64)> = None;
    for entry in catalog.iter() {
        let score = similarity(query.as_str(), entry.as_str());
        if score >= min_similarity && best.map_or(true, |(_, s)| score > s) {
            best = Some((entry, score));
        }
    }

    best.map(|(entry, _)| entry.clone())
}

/// Blend of Jaro-Winkler (typos, shared prefixes) and normalized Levenshtein.
pub fn similarity(a: &str, b: &str) -> f64 {
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}
