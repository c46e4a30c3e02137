//! Advice table models.

use serde::{Deserialize, Serialize};

use super::diagnosis::Severity;

/// Severity, urgency and recommended action for a diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advice {
    pub severity: Severity,
    pub urgency: String,
    pub action: String,
}

/// One row of the configurable advice table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdviceEntry {
    /// Diagnosis label (matched case-insensitively)
    pub label: String,
    pub severity: Severity,
    pub urgency: String,
    pub action: String,
}

impl AdviceEntry {
    pub fn advice(&self) -> Advice {
        Advice {
            severity: self.severity,
            urgency: self.urgency.clone(),
            action: self.action.clone(),
        }
    }
}
