//! Severity and advice resolution.
//!
//! Lookup is an exact, case-insensitive match on the diagnosis label. Any
//! label missing from the table gets the default advice with
//! [`Severity::Unknown`]; resolution never fails.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::models::{Advice, AdviceEntry, Severity};

/// Advice table loading errors.
#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Failed to read advice table: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate advice label: {0}")]
    DuplicateLabel(String),
}

pub type AdviceResult<T> = Result<T, AdviceError>;

/// Urgency text for unmapped labels.
pub const DEFAULT_URGENCY: &str =
    "Seek a professional consultation to confirm what is causing your symptoms.";

/// Action text for unmapped labels.
pub const DEFAULT_ACTION: &str = "Based on your symptoms, this condition may need medical attention. \
     Please consult a healthcare professional for confirmation, tests, and proper treatment.";

/// Label → advice mapping with a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceTable {
    entries: HashMap<String, Advice>,
    fallback: Advice,
}

impl Default for AdviceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdviceTable {
    /// Build a table from entries. Labels are case-folded; repeats are rejected.
    pub fn new(entries: Vec<AdviceEntry>) -> AdviceResult<Self> {
        let mut map = HashMap::new();
        for entry in entries {
            let key = fold_label(&entry.label);
            if map.insert(key, entry.advice()).is_some() {
                return Err(AdviceError::DuplicateLabel(entry.label));
            }
        }
        Ok(Self {
            entries: map,
            fallback: default_advice(),
        })
    }

    /// Parse a JSON array of [`AdviceEntry`].
    pub fn from_json(json: &str) -> AdviceResult<Self> {
        let entries: Vec<AdviceEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Load a JSON advice table file.
    pub fn load<P: AsRef<Path>>(path: P) -> AdviceResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        debug!(path = %path.display(), entries = table.len(), "loaded advice table");
        Ok(table)
    }

    /// Table with the built-in entries.
    pub fn builtin() -> Self {
        Self {
            entries: Self::builtin_entries(),
            fallback: default_advice(),
        }
    }

    /// Advice for a label, or the default.
    pub fn resolve(&self, label: &str) -> Advice {
        self.entries
            .get(&fold_label(label))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Whether the label has its own entry.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&fold_label(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: AdviceEntry) {
        self.entries.insert(fold_label(&entry.label), entry.advice());
    }

    fn builtin_entries() -> HashMap<String, Advice> {
        let mut map = HashMap::new();

        map.insert(
            "common cold".into(),
            advice(
                Severity::Mild,
                "Usually improves on its own within a week.",
                "It may be a common cold. Rest well, stay hydrated, and consider \
                 over-the-counter cold medicine if needed. If symptoms last more than a \
                 week or worsen, consult a doctor.",
            ),
        );
        map.insert(
            "flu".into(),
            advice(
                Severity::Mild,
                "Monitor your symptoms over the next few days.",
                "Rest, drink plenty of fluids and use fever reducers if needed. See a \
                 doctor if breathing becomes difficult or the fever lasts more than three days.",
            ),
        );
        map.insert(
            "covid-19".into(),
            advice(
                Severity::High,
                "Get tested as soon as possible.",
                "Symptoms may indicate COVID-19. Self-isolate, wear a mask, and get tested \
                 as soon as possible. Seek medical help if you experience breathing \
                 difficulty, chest pain, or confusion.",
            ),
        );
        map.insert(
            "migraine".into(),
            advice(
                Severity::Moderate,
                "Book an appointment if headaches are frequent.",
                "This looks like a migraine. Rest in a dark, quiet room and avoid screen \
                 time. If headaches are severe or very frequent, visit a neurologist.",
            ),
        );
        map.insert(
            "diabetes".into(),
            advice(
                Severity::Moderate,
                "Schedule a doctor's visit in the coming days.",
                "These symptoms may be related to diabetes. It's important to consult a \
                 doctor for blood sugar tests and long-term management.",
            ),
        );
        map.insert(
            "heart attack".into(),
            advice(
                Severity::Emergency,
                "Call emergency services now.",
                "Call your local emergency number immediately. Stop all activity and sit \
                 down while waiting for help.",
            ),
        );

        map
    }
}

fn advice(severity: Severity, urgency: &str, action: &str) -> Advice {
    Advice {
        severity,
        urgency: urgency.to_string(),
        action: action.to_string(),
    }
}

fn default_advice() -> Advice {
    advice(Severity::Unknown, DEFAULT_URGENCY, DEFAULT_ACTION)
}

fn fold_label(label: &str) -> String {
    label.trim().to_lowercase()
}
