//! Inference pipeline: match → encode → classify → rank → advise.
//!
//! A [`TriagePipeline`] is built once from its read-only parts and shared
//! by every session behind an `Arc`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::advice::{AdviceError, AdviceTable};
use crate::classifier::{ClassifierError, ModelHandle};
use crate::config::{ConfigError, EngineConfig, TriageSettings};
use crate::encoder::{decode, encode, EncodingError};
use crate::matcher::{normalize_symptom, SymptomMatcher};
use crate::models::{
    Catalog, CatalogError, DiagnosisResult, MatchOutcome, SymptomId, SymptomInput,
};
use crate::ranker::rank;

/// Errors on the diagnosis path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosisError {
    /// No recognized symptoms; the classifier is never called
    #[error("At least one recognized symptom is required for a diagnosis")]
    InsufficientInput,

    #[error("Inference unavailable: {0}")]
    ModelUnavailable(#[from] ClassifierError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
}

/// Errors while assembling a pipeline.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Advice table error: {0}")]
    Advice(#[from] AdviceError),

    #[error("Catalog does not match model features: {0}")]
    CatalogMismatch(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Read-only inference pipeline.
#[derive(Debug)]
pub struct TriagePipeline {
    catalog: Arc<Catalog>,
    model: Result<ModelHandle, ClassifierError>,
    advice: Arc<AdviceTable>,
    settings: TriageSettings,
}

impl TriagePipeline {
    /// Assemble a pipeline, checking the model against the catalog.
    pub fn new(
        catalog: Arc<Catalog>,
        model: ModelHandle,
        advice: Arc<AdviceTable>,
        settings: TriageSettings,
    ) -> EngineResult<Self> {
        check_compatible(&catalog, &model)?;
        Ok(Self {
            catalog,
            model: Ok(model),
            advice,
            settings,
        })
    }

    /// A pipeline that can match symptoms but reports every diagnosis as
    /// [`DiagnosisError::ModelUnavailable`].
    pub fn without_model(
        catalog: Arc<Catalog>,
        advice: Arc<AdviceTable>,
        settings: TriageSettings,
        reason: ClassifierError,
    ) -> Self {
        Self {
            catalog,
            model: Err(reason),
            advice,
            settings,
        }
    }

    /// Load every artifact named by `config`.
    ///
    /// A broken catalog, advice table or catalog/model mismatch is an error.
    /// A model that cannot be loaded only disables inference.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
        let advice = Arc::new(match &config.advice_path {
            Some(path) => AdviceTable::load(path)?,
            None => AdviceTable::builtin(),
        });

        info!(
            symptoms = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            advice_entries = advice.len(),
            "triage catalog ready"
        );

        match ModelHandle::load_linear(&config.model_path) {
            Ok(model) => Self::new(catalog, model, advice, config.settings.clone()),
            Err(e) => {
                warn!(
                    path = %config.model_path.display(),
                    error = %e,
                    "model unavailable, inference disabled"
                );
                Ok(Self::without_model(
                    catalog,
                    advice,
                    config.settings.clone(),
                    e,
                ))
            }
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn advice(&self) -> &AdviceTable {
        &self.advice
    }

    pub fn settings(&self) -> &TriageSettings {
        &self.settings
    }

    pub fn inference_available(&self) -> bool {
        self.model.is_ok()
    }

    /// Why inference is disabled, if it is.
    pub fn unavailable_reason(&self) -> Option<&ClassifierError> {
        self.model.as_ref().err()
    }

    /// Matcher over this pipeline's catalog.
    pub fn matcher(&self) -> SymptomMatcher<'_> {
        SymptomMatcher::new(&self.catalog)
            .with_suggestion_threshold(self.settings.suggestion_min_similarity)
    }

    pub fn match_input(&self, input: &SymptomInput) -> MatchOutcome {
        self.matcher().match_input(input)
    }

    /// Diagnose an accumulated symptom set.
    pub fn diagnose<'a, I>(&self, symptoms: I) -> Result<DiagnosisResult, DiagnosisError>
    where
        I: IntoIterator<Item = &'a SymptomId>,
    {
        let symptoms: Vec<&SymptomId> = symptoms.into_iter().collect();
        if symptoms.is_empty() {
            debug!("diagnosis requested with no symptoms");
            return Err(DiagnosisError::InsufficientInput);
        }

        let vector = encode(symptoms.iter().copied(), &self.catalog)?;
        let model = self.model.as_ref().map_err(|e| e.clone())?;
        let distribution = model.predict_probabilities(&vector)?;
        let ranking = rank(&distribution);

        let top = ranking.top().clone();
        let advice = self.advice.resolve(&top.label);

        info!(
            disease = %top.label,
            confidence = ranking.confidence_percent,
            severity = %advice.severity,
            symptoms = vector.active_count(),
            "diagnosis produced"
        );

        Ok(DiagnosisResult {
            disease: top.label,
            confidence_percent: ranking.confidence_percent,
            severity: advice.severity,
            urgency: advice.urgency,
            action: advice.action,
            recognized_symptoms: decode(&vector, &self.catalog)?,
            alternative_diagnoses: ranking.candidates,
            needs_more_info: ranking.needs_more_info,
        })
    }

    /// Single-shot: match the input, then diagnose what was recognized.
    pub fn diagnose_input(
        &self,
        input: &SymptomInput,
    ) -> Result<(MatchOutcome, DiagnosisResult), DiagnosisError> {
        let outcome = self.match_input(input);
        let result = self.diagnose(&outcome.recognized)?;
        Ok((outcome, result))
    }
}

fn check_compatible(catalog: &Catalog, model: &ModelHandle) -> EngineResult<()> {
    if model.feature_count() != catalog.len() {
        return Err(EngineError::CatalogMismatch(format!(
            "model has {} features, catalog has {} symptoms",
            model.feature_count(),
            catalog.len()
        )));
    }

    if let Some(names) = model.feature_names() {
        let mismatch = names
            .iter()
            .zip(catalog.iter())
            .position(|(name, entry)| normalize_symptom(name) != entry.as_str());
        if let Some(i) = mismatch {
            return Err(EngineError::CatalogMismatch(format!(
                "feature {} is '{}' in the model but '{}' in the catalog",
                i,
                names[i],
                catalog.entries()[i]
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FixedDistributionClassifier;
    use crate::models::Severity;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(["fever", "cough", "headache"]).unwrap())
    }

    fn flu_pipeline() -> (TriagePipeline, Arc<FixedDistributionClassifier>) {
        let fixed = Arc::new(FixedDistributionClassifier::new(
            3,
            &[("flu", 0.82), ("cold", 0.15), ("migraine", 0.03)],
        ));
        let pipeline = TriagePipeline::new(
            catalog(),
            ModelHandle::new(fixed.clone()),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        )
        .unwrap();
        (pipeline, fixed)
    }

    #[test]
    fn test_example_scenario() {
        let (pipeline, _) = flu_pipeline();
        let input = SymptomInput::List(vec!["fever".into(), "cough".into()]);

        let (outcome, result) = pipeline.diagnose_input(&input).unwrap();

        assert!(outcome.unmatched.is_empty());
        assert_eq!(result.disease, "flu");
        assert!((result.confidence_percent - 82.0).abs() < 1e-9);
        assert_eq!(result.confidence_display(), "82.0%");
        assert!(!result.needs_more_info);
        assert_eq!(result.severity, Severity::Mild);
        assert_eq!(
            result.recognized_symptoms,
            vec![SymptomId::new("fever"), SymptomId::new("cough")]
        );
        let alternatives: Vec<(&str, f64)> = result
            .alternative_diagnoses
            .iter()
            .map(|c| (c.label.as_str(), c.probability))
            .collect();
        assert_eq!(
            alternatives,
            vec![("flu", 0.82), ("cold", 0.15), ("migraine", 0.03)]
        );
    }

    #[test]
    fn test_empty_set_never_calls_classifier() {
        let (pipeline, fixed) = flu_pipeline();
        let none: Vec<SymptomId> = Vec::new();

        assert_eq!(
            pipeline.diagnose(&none),
            Err(DiagnosisError::InsufficientInput)
        );
        assert_eq!(fixed.call_count(), 0);
    }

    #[test]
    fn test_free_text_with_no_match_is_insufficient() {
        let (pipeline, fixed) = flu_pipeline();
        let input = SymptomInput::Text("I just feel off".into());

        assert_eq!(
            pipeline.diagnose_input(&input).err(),
            Some(DiagnosisError::InsufficientInput)
        );
        assert_eq!(fixed.call_count(), 0);
    }

    #[test]
    fn test_unmapped_label_uses_default_advice() {
        let fixed = Arc::new(FixedDistributionClassifier::new(
            3,
            &[("rare_disease_x", 0.9), ("flu", 0.1)],
        ));
        let pipeline = TriagePipeline::new(
            catalog(),
            ModelHandle::new(fixed),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        )
        .unwrap();

        let result = pipeline.diagnose(&[SymptomId::new("fever")]).unwrap();

        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(result.action, crate::advice::DEFAULT_ACTION);
    }

    #[test]
    fn test_low_confidence_needs_more_info() {
        let fixed = Arc::new(FixedDistributionClassifier::new(
            3,
            &[("flu", 0.5), ("cold", 0.5)],
        ));
        let pipeline = TriagePipeline::new(
            catalog(),
            ModelHandle::new(fixed),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        )
        .unwrap();

        let result = pipeline.diagnose(&[SymptomId::new("cough")]).unwrap();
        assert_eq!(result.disease, "flu");
        assert!(result.needs_more_info);
    }

    #[test]
    fn test_sixty_five_percent_still_needs_more_info() {
        let fixed = Arc::new(FixedDistributionClassifier::new(
            3,
            &[("flu", 0.65), ("cold", 0.35)],
        ));
        let pipeline = TriagePipeline::new(
            catalog(),
            ModelHandle::new(fixed),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        )
        .unwrap();

        let result = pipeline.diagnose(&[SymptomId::new("fever")]).unwrap();
        assert!((result.confidence_percent - 65.0).abs() < 1e-9);
        assert!(result.needs_more_info);
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let fixed = Arc::new(FixedDistributionClassifier::new(5, &[("flu", 1.0)]));
        let result = TriagePipeline::new(
            catalog(),
            ModelHandle::new(fixed),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::CatalogMismatch(_))));
    }

    #[test]
    fn test_feature_name_mismatch_rejected() {
        use symptom_triage_model::{LinearModel, ModelArtifact};

        let model = LinearModel::new(ModelArtifact {
            labels: vec!["flu".into()],
            feature_names: vec!["fever".into(), "headache".into(), "cough".into()],
            weights: vec![vec![1.0, 1.0, 1.0]],
            intercepts: vec![0.0],
        })
        .unwrap();

        let result = TriagePipeline::new(
            catalog(),
            ModelHandle::new(Arc::new(model)),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
        );
        match result {
            Err(EngineError::CatalogMismatch(msg)) => assert!(msg.contains("feature 1")),
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_without_model_reports_unavailable() {
        let pipeline = TriagePipeline::without_model(
            catalog(),
            Arc::new(AdviceTable::builtin()),
            TriageSettings::default(),
            ClassifierError::Unavailable("missing artifact".into()),
        );

        assert!(!pipeline.inference_available());
        let outcome = pipeline.match_input(&SymptomInput::Text("fever".into()));
        assert_eq!(outcome.recognized, vec![SymptomId::new("fever")]);

        let result = pipeline.diagnose(&outcome.recognized);
        assert!(matches!(result, Err(DiagnosisError::ModelUnavailable(_))));
    }
}
