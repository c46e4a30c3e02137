//! Diagnosis result models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::SymptomId;

/// Triage severity tier driving the advice shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency,
    High,
    Moderate,
    Mild,
    /// No advice entry exists for the label
    Unknown,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Emergency => "emergency",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Mild => "mild",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A single label with its classifier probability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisCandidate {
    /// Classifier label
    pub label: String,
    /// Probability (0.0 - 1.0)
    pub probability: f64,
}

impl DiagnosisCandidate {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Full outcome of one diagnosis request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisResult {
    /// Label of the top-ranked candidate
    pub disease: String,
    /// Top probability × 100, full precision
    pub confidence_percent: f64,
    pub severity: Severity,
    /// Urgency text for the severity tier
    pub urgency: String,
    /// Recommended next step
    pub action: String,
    /// Symptoms that went into the encoded vector, in catalog order
    pub recognized_symptoms: Vec<SymptomId>,
    /// Every candidate, most probable first
    pub alternative_diagnoses: Vec<DiagnosisCandidate>,
    /// True when confidence falls below the reporting threshold
    pub needs_more_info: bool,
}

impl DiagnosisResult {
    /// Confidence rounded to one decimal place for display.
    pub fn confidence_display(&self) -> String {
        format!("{:.1}%", self.confidence_percent)
    }

    /// Candidates after the top one.
    pub fn other_candidates(&self) -> &[DiagnosisCandidate] {
        self.alternative_diagnoses.get(1..).unwrap_or(&[])
    }
}
