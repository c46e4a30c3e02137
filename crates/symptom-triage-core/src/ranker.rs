//! Diagnosis ranking.
//!
//! Turns a probability distribution into an ordered candidate list and a
//! confidence figure. Sorting is stable, so equal probabilities keep the
//! classifier's native label order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::classifier::ProbabilityDistribution;
use crate::models::DiagnosisCandidate;

/// Confidence (percent) below which more symptoms are requested.
pub const NEEDS_MORE_INFO_THRESHOLD: f64 = 70.0;

/// Ranked view of a distribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ranking {
    /// All candidates, most probable first
    pub candidates: Vec<DiagnosisCandidate>,
    /// Top probability × 100
    pub confidence_percent: f64,
    pub needs_more_info: bool,
}

impl Ranking {
    /// The top-ranked candidate.
    pub fn top(&self) -> &DiagnosisCandidate {
        // A validated distribution is never empty.
        &self.candidates[0]
    }
}

/// Rank a distribution.
pub fn rank(distribution: &ProbabilityDistribution) -> Ranking {
    let mut candidates: Vec<DiagnosisCandidate> = distribution
        .entries()
        .iter()
        .map(|(label, p)| DiagnosisCandidate::new(label.clone(), *p))
        .collect();

    // Numeric comparison, so -0.0 and 0.0 tie. NaN never survives validation.
    candidates.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });

    let confidence_percent = candidates
        .first()
        .map(|c| c.probability * 100.0)
        .unwrap_or(0.0);

    Ranking {
        candidates,
        confidence_percent,
        needs_more_info: needs_more_info(confidence_percent),
    }
}

/// True iff `confidence_percent` is strictly below 70.
pub fn needs_more_info(confidence_percent: f64) -> bool {
    confidence_percent < NEEDS_MORE_INFO_THRESHOLD
}
