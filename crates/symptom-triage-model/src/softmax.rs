//! Softmax inference over a validated artifact.

use std::path::Path;

use tracing::debug;

use crate::artifact::{ModelArtifact, ModelError, ModelResult};

/// A loaded multinomial linear model.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone)]
pub struct LinearModel {
    artifact: ModelArtifact,
}

impl LinearModel {
    /// Build a model from an already-parsed artifact.
    pub fn new(artifact: ModelArtifact) -> ModelResult<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Load a model from a JSON artifact file.
    pub fn load<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path)?;
        debug!(
            path = %path.display(),
            labels = artifact.labels.len(),
            features = artifact.feature_names.len(),
            "loaded model artifact"
        );
        Ok(Self { artifact })
    }

    /// Labels in native order.
    pub fn labels(&self) -> &[String] {
        &self.artifact.labels
    }

    /// Feature names in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.artifact.feature_names.len()
    }

    /// Probability for each label, in native label order. Sums to 1.
    pub fn predict_proba(&self, features: &[u8]) -> ModelResult<Vec<f64>> {
        if features.len() != self.feature_count() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.feature_count(),
                actual: features.len(),
            });
        }

        let logits: Vec<f64> = self
            .artifact
            .weights
            .iter()
            .zip(&self.artifact.intercepts)
            .map(|(row, intercept)| {
                row.iter()
                    .zip(features)
                    .filter(|(_, x)| **x != 0)
                    .map(|(w, _)| w)
                    .sum::<f64>()
                    + intercept
            })
            .collect();

        Ok(softmax(&logits))
    }

    /// Label with the highest probability. Ties go to the earliest label.
    pub fn predict(&self, features: &[u8]) -> ModelResult<&str> {
        let probabilities = self.predict_proba(features)?;
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        Ok(self.artifact.labels[best].as_str())
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flu_cold_model() -> LinearModel {
        LinearModel::new(ModelArtifact {
            labels: vec!["flu".into(), "cold".into(), "migraine".into()],
            feature_names: vec!["fever".into(), "cough".into(), "headache".into()],
            weights: vec![
                vec![3.0, 1.0, 0.0],
                vec![0.0, 2.0, 0.0],
                vec![0.0, 0.0, 3.0],
            ],
            intercepts: vec![0.0, 0.0, 0.0],
        })
        .unwrap()
    }

    #[test]
    fn test_predict_fever_cough_is_flu() {
        let model = flu_cold_model();
        assert_eq!(model.predict(&[1, 1, 0]).unwrap(), "flu");
    }

    #[test]
    fn test_predict_headache_is_migraine() {
        let model = flu_cold_model();
        assert_eq!(model.predict(&[0, 0, 1]).unwrap(), "migraine");
    }

    #[test]
    fn test_zero_vector_ties_go_to_first_label() {
        let model = flu_cold_model();
        let probs = model.predict_proba(&[0, 0, 0]).unwrap();
        assert!((probs[0] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(model.predict(&[0, 0, 0]).unwrap(), "flu");
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = flu_cold_model();
        assert!(matches!(
            model.predict_proba(&[1, 0]),
            Err(ModelError::FeatureCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_softmax_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    proptest! {
        #[test]
        fn prop_probabilities_sum_to_one(bits in proptest::collection::vec(0u8..2, 3)) {
            let model = flu_cold_model();
            let probs = model.predict_proba(&bits).unwrap();
            let total: f64 = probs.iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
            prop_assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }
}
