//! Model artifact parsing and shape validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model loading and inference errors.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid artifact shape: {0}")]
    InvalidShape(String),

    #[error("Input has {actual} features, model expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Serialized form of a trained linear model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    /// Output labels in the model's native order
    pub labels: Vec<String>,
    /// Input feature names, in the order the model was trained on
    pub feature_names: Vec<String>,
    /// One weight row per label, one column per feature
    pub weights: Vec<Vec<f64>>,
    /// One intercept per label
    pub intercepts: Vec<f64>,
}

impl ModelArtifact {
    /// Parse an artifact from a JSON string.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read and parse an artifact file.
    pub fn load<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that labels, weights and intercepts agree on dimensions.
    pub fn validate(&self) -> ModelResult<()> {
        if self.labels.is_empty() {
            return Err(ModelError::InvalidShape("no labels".into()));
        }
        let mut seen = HashSet::new();
        for label in &self.labels {
            if !seen.insert(label.as_str()) {
                return Err(ModelError::InvalidShape(format!(
                    "label '{}' appears more than once",
                    label
                )));
            }
        }
        if self.weights.len() != self.labels.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} weight rows for {} labels",
                self.weights.len(),
                self.labels.len()
            )));
        }
        if self.intercepts.len() != self.labels.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} intercepts for {} labels",
                self.intercepts.len(),
                self.labels.len()
            )));
        }
        let n_features = self.feature_names.len();
        for (label, row) in self.labels.iter().zip(&self.weights) {
            if row.len() != n_features {
                return Err(ModelError::InvalidShape(format!(
                    "label '{}' has {} weights, expected {}",
                    label,
                    row.len(),
                    n_features
                )));
            }
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidShape("non-finite parameter".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "labels": ["flu", "cold"],
        "feature_names": ["fever", "cough"],
        "weights": [[2.0, 0.5], [0.1, 1.5]],
        "intercepts": [0.0, -0.2]
    }"#;

    #[test]
    fn test_parse_valid_artifact() {
        let artifact = ModelArtifact::from_json(VALID).unwrap();
        assert_eq!(artifact.labels, vec!["flu", "cold"]);
        assert_eq!(artifact.feature_names.len(), 2);
    }

    #[test]
    fn test_rejects_ragged_weights() {
        let json = r#"{
            "labels": ["flu", "cold"],
            "feature_names": ["fever", "cough"],
            "weights": [[2.0, 0.5], [0.1]],
            "intercepts": [0.0, 0.0]
        }"#;
        assert!(matches!(
            ModelArtifact::from_json(json),
            Err(ModelError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_rejects_missing_intercepts() {
        let json = r#"{
            "labels": ["flu"],
            "feature_names": ["fever"],
            "weights": [[1.0]],
            "intercepts": []
        }"#;
        assert!(matches!(
            ModelArtifact::from_json(json),
            Err(ModelError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_rejects_repeated_label() {
        let json = r#"{
            "labels": ["flu", "cold", "flu"],
            "feature_names": ["fever"],
            "weights": [[1.0], [0.5], [0.2]],
            "intercepts": [0.0, 0.0, 0.0]
        }"#;
        match ModelArtifact::from_json(json) {
            Err(ModelError::InvalidShape(msg)) => assert!(msg.contains("'flu'")),
            other => panic!("expected InvalidShape, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_labels() {
        let json = r#"{"labels": [], "feature_names": [], "weights": [], "intercepts": []}"#;
        assert!(ModelArtifact::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelArtifact::from_json("not json"),
            Err(ModelError::JsonParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ModelArtifact::load("/nonexistent/model.json");
        assert!(matches!(result, Err(ModelError::Io(_))));
    }
}
