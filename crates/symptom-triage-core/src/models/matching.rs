//! Symptom submission models.

use serde::{Deserialize, Serialize};

use super::catalog::SymptomId;

/// User-supplied symptom mentions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SymptomInput {
    /// Explicit tokens, each matched exactly after normalization
    List(Vec<String>),
    /// Free text, scanned for catalog entries as substrings
    Text(String),
}

impl SymptomInput {
    /// Raw text for the conversation transcript.
    pub fn transcript_text(&self) -> String {
        match self {
            Self::List(tokens) => tokens.join(", "),
            Self::Text(text) => text.clone(),
        }
    }

    /// True when there is nothing but whitespace to match.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::List(tokens) => tokens.iter().all(|t| t.trim().is_empty()),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

/// A token the matcher could not resolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmatchedSymptom {
    /// The token as the user supplied it (trimmed)
    pub token: String,
    /// Closest catalog entry, if one is similar enough
    pub suggestion: Option<SymptomId>,
}

/// Result of matching one submission against the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchOutcome {
    /// Matched catalog entries, in catalog order, without repeats
    pub recognized: Vec<SymptomId>,
    pub unmatched: Vec<UnmatchedSymptom>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.recognized.is_empty() && self.unmatched.is_empty()
    }

    /// Tokens without a match.
    pub fn unmatched_tokens(&self) -> Vec<&str> {
        self.unmatched.iter().map(|u| u.token.as_str()).collect()
    }
}
