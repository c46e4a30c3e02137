//! Symptom text normalization.
//!
//! Handles:
//! - Trimming and case folding (`" FEVER "` → `"fever"`)
//! - Whitespace collapsing (`"skin   rash"` → `"skin rash"`)
//! - Splitting comma-separated lists and free-text fragments

/// Fold a symptom mention into its canonical comparison form.
pub fn normalize_symptom(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a comma-separated list of symptoms, dropping blank entries.
pub fn split_symptom_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split free text into clause-like fragments for unmatched reporting.
pub fn split_fragments(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
