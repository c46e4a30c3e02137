//! Classifier boundary.
//!
//! The statistical model is a black box behind [`Classifier`]. The core only
//! encodes vectors, asks for a probability per label, and checks that what
//! comes back is a usable distribution.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use symptom_triage_model::{LinearModel, ModelError};
use thiserror::Error;
use tracing::debug;

use crate::encoder::SymptomVector;

/// Allowed drift of a distribution's total from 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Classifier errors. Every variant makes inference unavailable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Model artifact unavailable: {0}")]
    Unavailable(String),

    #[error("Model expects {expected} features, vector has {actual}")]
    IncompatibleVector { expected: usize, actual: usize },

    #[error("Model returned an invalid distribution: {0}")]
    InvalidDistribution(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

impl From<ModelError> for ClassifierError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::FeatureCountMismatch { expected, actual } => {
                ClassifierError::IncompatibleVector { expected, actual }
            }
            other => ClassifierError::Unavailable(other.to_string()),
        }
    }
}

/// Probability per label, in the classifier's native label order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    entries: Vec<(String, f64)>,
}

impl ProbabilityDistribution {
    /// Validate and wrap `(label, probability)` pairs.
    pub fn new(entries: Vec<(String, f64)>) -> ClassifierResult<Self> {
        if entries.is_empty() {
            return Err(ClassifierError::InvalidDistribution("no labels".into()));
        }
        let mut seen = HashSet::new();
        for (label, _) in &entries {
            if !seen.insert(label.as_str()) {
                return Err(ClassifierError::InvalidDistribution(format!(
                    "label '{}' appears more than once",
                    label
                )));
            }
        }
        if let Some((label, p)) = entries
            .iter()
            .find(|(_, p)| !p.is_finite() || *p < 0.0 || *p > 1.0)
        {
            return Err(ClassifierError::InvalidDistribution(format!(
                "probability {} for '{}' is outside [0, 1]",
                p, label
            )));
        }
        let total: f64 = entries.iter().map(|(_, p)| p).sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ClassifierError::InvalidDistribution(format!(
                "probabilities sum to {}",
                total
            )));
        }
        Ok(Self { entries })
    }

    /// Pair labels with probabilities positionally.
    pub fn from_parts(labels: &[String], probabilities: &[f64]) -> ClassifierResult<Self> {
        if labels.len() != probabilities.len() {
            return Err(ClassifierError::InvalidDistribution(format!(
                "{} probabilities for {} labels",
                probabilities.len(),
                labels.len()
            )));
        }
        Self::new(
            labels
                .iter()
                .cloned()
                .zip(probabilities.iter().copied())
                .collect(),
        )
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }
}

/// A trained classifier over symptom vectors.
///
/// Implementations are loaded once and never mutated, so they can be
/// shared across sessions without locking.
pub trait Classifier: Send + Sync {
    /// Labels in native order.
    fn labels(&self) -> Vec<String>;

    /// Number of features the model was trained on.
    fn feature_count(&self) -> usize;

    /// Probability for every label.
    fn predict_probabilities(&self, vector: &SymptomVector)
        -> ClassifierResult<ProbabilityDistribution>;

    /// Most probable label. Ties go to the earliest label.
    fn predict(&self, vector: &SymptomVector) -> ClassifierResult<String> {
        let distribution = self.predict_probabilities(vector)?;
        let mut best: Option<&(String, f64)> = None;
        for entry in distribution.entries() {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(label, _)| label.clone())
            .ok_or_else(|| ClassifierError::InvalidDistribution("no labels".into()))
    }

    /// Feature names, when the model carries them.
    fn feature_names(&self) -> Option<Vec<String>> {
        None
    }
}

impl Classifier for LinearModel {
    fn labels(&self) -> Vec<String> {
        LinearModel::labels(self).to_vec()
    }

    fn feature_count(&self) -> usize {
        LinearModel::feature_count(self)
    }

    fn predict_probabilities(
        &self,
        vector: &SymptomVector,
    ) -> ClassifierResult<ProbabilityDistribution> {
        let probabilities = self.predict_proba(vector.as_slice())?;
        ProbabilityDistribution::from_parts(LinearModel::labels(self), &probabilities)
    }

    fn feature_names(&self) -> Option<Vec<String>> {
        Some(LinearModel::feature_names(self).to_vec())
    }
}

/// Shared handle to a loaded classifier.
///
/// Checks vector length before every call, so a model/catalog mismatch
/// surfaces as [`ClassifierError::IncompatibleVector`] instead of reaching
/// the model.
#[derive(Clone)]
pub struct ModelHandle {
    inner: Arc<dyn Classifier>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("labels", &self.inner.labels().len())
            .field("features", &self.inner.feature_count())
            .finish()
    }
}

impl ModelHandle {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { inner: classifier }
    }

    /// Load the linear model artifact at `path`.
    pub fn load_linear<P: AsRef<std::path::Path>>(path: P) -> ClassifierResult<Self> {
        let model = LinearModel::load(path)?;
        Ok(Self::new(Arc::new(model)))
    }

    pub fn feature_count(&self) -> usize {
        self.inner.feature_count()
    }

    pub fn labels(&self) -> Vec<String> {
        self.inner.labels()
    }

    pub fn feature_names(&self) -> Option<Vec<String>> {
        self.inner.feature_names()
    }

    pub fn predict_probabilities(
        &self,
        vector: &SymptomVector,
    ) -> ClassifierResult<ProbabilityDistribution> {
        self.check_vector(vector)?;
        debug!(active = vector.active_count(), "invoking classifier");
        self.inner.predict_probabilities(vector)
    }

    pub fn predict(&self, vector: &SymptomVector) -> ClassifierResult<String> {
        self.check_vector(vector)?;
        self.inner.predict(vector)
    }

    fn check_vector(&self, vector: &SymptomVector) -> ClassifierResult<()> {
        let expected = self.inner.feature_count();
        if vector.len() != expected {
            return Err(ClassifierError::IncompatibleVector {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Classifier that returns the same distribution for every input.
///
/// Counts calls, so callers can assert the model was (or was not) consulted.
pub struct FixedDistributionClassifier {
    labels: Vec<String>,
    probabilities: Vec<f64>,
    feature_count: usize,
    calls: AtomicUsize,
}

impl FixedDistributionClassifier {
    /// `distribution` is in native label order.
    pub fn new(feature_count: usize, distribution: &[(&str, f64)]) -> Self {
        Self {
            labels: distribution.iter().map(|(l, _)| l.to_string()).collect(),
            probabilities: distribution.iter().map(|(_, p)| *p).collect(),
            feature_count,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of prediction calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedDistributionClassifier {
    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_probabilities(
        &self,
        _vector: &SymptomVector,
    ) -> ClassifierResult<ProbabilityDistribution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProbabilityDistribution::from_parts(&self.labels, &self.probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::models::{Catalog, SymptomId};
    use symptom_triage_model::ModelArtifact;

    fn catalog() -> Catalog {
        Catalog::new(["fever", "cough", "headache"]).unwrap()
    }

    #[test]
    fn test_distribution_rejects_bad_sum() {
        let result = ProbabilityDistribution::new(vec![("a".into(), 0.5), ("b".into(), 0.4)]);
        assert!(matches!(result, Err(ClassifierError::InvalidDistribution(_))));
    }

    #[test]
    fn test_distribution_rejects_out_of_range() {
        let result = ProbabilityDistribution::new(vec![("a".into(), 1.5), ("b".into(), -0.5)]);
        assert!(matches!(result, Err(ClassifierError::InvalidDistribution(_))));

        let nan = ProbabilityDistribution::new(vec![("a".into(), f64::NAN)]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_distribution_rejects_repeated_label() {
        let result = ProbabilityDistribution::new(vec![
            ("flu".into(), 0.5),
            ("cold".into(), 0.2),
            ("flu".into(), 0.3),
        ]);
        match result {
            Err(ClassifierError::InvalidDistribution(msg)) => assert!(msg.contains("'flu'")),
            other => panic!("expected InvalidDistribution, got {:?}", other),
        }
    }

    #[test]
    fn test_distribution_accepts_rounding_noise() {
        let dist = ProbabilityDistribution::new(vec![
            ("a".into(), 0.1),
            ("b".into(), 0.2),
            ("c".into(), 0.7000000001),
        ])
        .unwrap();
        assert_eq!(dist.probability_of("b"), Some(0.2));
        assert_eq!(dist.probability_of("z"), None);
    }

    #[test]
    fn test_handle_rejects_wrong_length() {
        let fixed = Arc::new(FixedDistributionClassifier::new(4, &[("flu", 1.0)]));
        let handle = ModelHandle::new(fixed.clone());
        let vector = encode(&[SymptomId::new("fever")], &catalog()).unwrap();

        let result = handle.predict_probabilities(&vector);

        assert_eq!(
            result,
            Err(ClassifierError::IncompatibleVector {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(fixed.call_count(), 0);
    }

    #[test]
    fn test_predict_returns_top_label() {
        let fixed = FixedDistributionClassifier::new(
            3,
            &[("flu", 0.82), ("cold", 0.15), ("migraine", 0.03)],
        );
        let handle = ModelHandle::new(Arc::new(fixed));
        let vector = encode(&[SymptomId::new("fever")], &catalog()).unwrap();

        assert_eq!(handle.predict(&vector).unwrap(), "flu");
    }

    #[test]
    fn test_linear_model_through_handle() {
        let model = LinearModel::new(ModelArtifact {
            labels: vec!["flu".into(), "migraine".into()],
            feature_names: vec!["fever".into(), "cough".into(), "headache".into()],
            weights: vec![vec![2.0, 2.0, 0.0], vec![0.0, 0.0, 3.0]],
            intercepts: vec![0.0, 0.0],
        })
        .unwrap();
        let handle = ModelHandle::new(Arc::new(model));
        let vector = encode(&[SymptomId::new("headache")], &catalog()).unwrap();

        let dist = handle.predict_probabilities(&vector).unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(handle.predict(&vector).unwrap(), "migraine");
        assert_eq!(handle.feature_names().map(|f| f.len()), Some(3));
    }

    #[test]
    fn test_model_error_conversion() {
        let err: ClassifierError = ModelError::FeatureCountMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert_eq!(
            err,
            ClassifierError::IncompatibleVector {
                expected: 3,
                actual: 2
            }
        );

        let err: ClassifierError = ModelError::InvalidShape("bad".into()).into();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
