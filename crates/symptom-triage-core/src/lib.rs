//! Symptom-Triage Core Library
//!
//! Maps reported symptoms to a ranked list of likely conditions and a
//! severity/urgency recommendation. Triage guidance, not a diagnosis.
//!
//! # Architecture
//!
//! ```text
//!  free text / symptom list
//!            │
//!            ▼
//!       Symptom Matcher ◄──── Catalog (ordered, feature space)
//!            │
//!            ▼
//!       Vector Encoder  ──── [0/1 per catalog entry]
//!            │
//!            ▼
//!     Classifier Adapter ──── loaded model artifact (black box)
//!            │
//!            ▼
//!      Diagnosis Ranker ──── confidence, needs-more-info flag
//!            │
//!            ▼
//!   Severity & Advice Resolver ◄──── advice table (data)
//!            │
//!            ▼
//!      DiagnosisResult
//! ```
//!
//! A [`Consultation`] wraps the pipeline for multi-turn use, accumulating
//! recognized symptoms between turns.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Catalog, DiagnosisResult, ConversationState, etc.)
//! - [`matcher`]: Normalization and symptom matching
//! - [`encoder`]: Binary feature vectors
//! - [`classifier`]: Classifier boundary
//! - [`ranker`]: Candidate ordering and confidence
//! - [`advice`]: Severity/urgency/action lookup
//! - [`pipeline`]: The assembled inference path
//! - [`conversation`]: Multi-turn state machine

pub mod advice;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod encoder;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod ranker;

// Re-export commonly used types
pub use advice::AdviceTable;
pub use classifier::{Classifier, ClassifierError, ModelHandle, ProbabilityDistribution};
pub use config::{EngineConfig, TriageSettings};
pub use conversation::Consultation;
pub use encoder::{EncodingError, SymptomVector};
pub use matcher::SymptomMatcher;
pub use models::{
    Catalog, ConversationState, DiagnosisCandidate, DiagnosisResult, MatchOutcome, Severity,
    Stage, SymptomId, SymptomInput,
};
pub use pipeline::{DiagnosisError, EngineError, TriagePipeline};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TriageError {
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DiagnosisError> for TriageError {
    fn from(e: DiagnosisError) -> Self {
        match e {
            DiagnosisError::InsufficientInput => TriageError::InsufficientInput(e.to_string()),
            DiagnosisError::ModelUnavailable(_) => TriageError::ModelUnavailable(e.to_string()),
            DiagnosisError::Encoding(_) => TriageError::EncodingError(e.to_string()),
        }
    }
}

impl From<EngineError> for TriageError {
    fn from(e: EngineError) -> Self {
        TriageError::ConfigError(e.to_string())
    }
}

impl From<config::ConfigError> for TriageError {
    fn from(e: config::ConfigError) -> Self {
        TriageError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TriageError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TriageError::InternalError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an engine from a JSON config file.
#[uniffi::export]
pub fn open_engine(config_path: String) -> Result<Arc<TriageEngine>, TriageError> {
    let config = EngineConfig::load(&config_path)?;
    let pipeline = TriagePipeline::from_config(&config)?;
    Ok(TriageEngine::from_pipeline(pipeline))
}

/// Open an engine from artifact paths with default settings.
#[uniffi::export]
pub fn open_engine_with_paths(
    catalog_path: String,
    model_path: String,
    advice_path: Option<String>,
) -> Result<Arc<TriageEngine>, TriageError> {
    let mut config = EngineConfig::new(catalog_path, model_path);
    config.advice_path = advice_path.map(Into::into);
    let pipeline = TriagePipeline::from_config(&config)?;
    Ok(TriageEngine::from_pipeline(pipeline))
}

// =========================================================================
// Engine (shared, read-only)
// =========================================================================

/// Loaded artifacts shared by all sessions.
#[derive(uniffi::Object)]
pub struct TriageEngine {
    pipeline: Arc<TriagePipeline>,
}

impl TriageEngine {
    /// Wrap an already-built pipeline.
    pub fn from_pipeline(pipeline: TriagePipeline) -> Arc<Self> {
        Arc::new(Self {
            pipeline: Arc::new(pipeline),
        })
    }

    pub fn pipeline(&self) -> &Arc<TriagePipeline> {
        &self.pipeline
    }
}

#[uniffi::export]
impl TriageEngine {
    /// Whether diagnosis requests can succeed.
    pub fn inference_available(&self) -> bool {
        self.pipeline.inference_available()
    }

    /// Why diagnosis requests fail, when inference is disabled.
    pub fn unavailable_reason(&self) -> Option<String> {
        self.pipeline.unavailable_reason().map(ToString::to_string)
    }

    /// Fingerprint of the live symptom catalog.
    pub fn catalog_fingerprint(&self) -> String {
        self.pipeline.catalog().fingerprint()
    }

    /// All canonical symptoms, in feature order.
    pub fn symptom_catalog(&self) -> Vec<String> {
        self.pipeline
            .catalog()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    /// Start a new, isolated consultation.
    pub fn new_session(&self) -> Arc<ConsultationSession> {
        Arc::new(ConsultationSession {
            consultation: Mutex::new(Consultation::new(self.pipeline.clone())),
        })
    }
}

// =========================================================================
// Session (one per user)
// =========================================================================

/// Conversational turn API for one user.
#[derive(uniffi::Object)]
pub struct ConsultationSession {
    consultation: Mutex<Consultation>,
}

#[uniffi::export]
impl ConsultationSession {
    pub fn session_id(&self) -> Result<String, TriageError> {
        let consultation = self.consultation.lock()?;
        Ok(consultation.state().session_id.clone())
    }

    /// The welcome message for the greeting stage.
    pub fn welcome(&self) -> Result<String, TriageError> {
        let consultation = self.consultation.lock()?;
        Ok(consultation.welcome().to_string())
    }

    /// Submit free text; symptoms are found by substring.
    pub fn submit_text(&self, text: String) -> Result<FfiSubmission, TriageError> {
        let mut consultation = self.consultation.lock()?;
        Ok(consultation.submit_text(&text).into())
    }

    /// Submit explicit symptom names.
    pub fn submit_list(&self, symptoms: Vec<String>) -> Result<FfiSubmission, TriageError> {
        let mut consultation = self.consultation.lock()?;
        Ok(consultation.submit(SymptomInput::List(symptoms)).into())
    }

    /// Diagnose everything submitted so far.
    pub fn request_diagnosis(&self) -> Result<FfiDiagnosis, TriageError> {
        let mut consultation = self.consultation.lock()?;
        let result = consultation.request_diagnosis()?;
        Ok(result.into())
    }

    /// Remove a previously submitted symptom.
    pub fn remove_symptom(&self, symptom: String) -> Result<bool, TriageError> {
        let mut consultation = self.consultation.lock()?;
        Ok(consultation.remove_symptom(&symptom))
    }

    /// Clear symptoms and history. Returns the welcome message.
    pub fn reset_session(&self) -> Result<String, TriageError> {
        let mut consultation = self.consultation.lock()?;
        Ok(consultation.reset().to_string())
    }

    pub fn selected_symptoms(&self) -> Result<Vec<String>, TriageError> {
        let consultation = self.consultation.lock()?;
        Ok(consultation
            .selected_symptoms()
            .into_iter()
            .map(SymptomId::into_string)
            .collect())
    }

    /// Current stage: "greeting", "collecting" or "diagnosing".
    pub fn stage(&self) -> Result<String, TriageError> {
        let consultation = self.consultation.lock()?;
        Ok(stage_name(consultation.stage()).to_string())
    }

    pub fn history(&self) -> Result<Vec<FfiTurn>, TriageError> {
        let consultation = self.consultation.lock()?;
        Ok(consultation
            .state()
            .history
            .iter()
            .map(|turn| FfiTurn {
                role: match turn.role {
                    models::Role::User => "user".to_string(),
                    models::Role::Assistant => "assistant".to_string(),
                },
                text: turn.text.clone(),
                timestamp: turn.timestamp.to_rfc3339(),
            })
            .collect())
    }
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Greeting => "greeting",
        Stage::Collecting => "collecting",
        Stage::Diagnosing => "diagnosing",
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe submission outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub recognized: Vec<String>,
    pub unmatched: Vec<FfiUnmatched>,
}

impl From<MatchOutcome> for FfiSubmission {
    fn from(outcome: MatchOutcome) -> Self {
        Self {
            recognized: outcome
                .recognized
                .into_iter()
                .map(SymptomId::into_string)
                .collect(),
            unmatched: outcome
                .unmatched
                .into_iter()
                .map(|u| FfiUnmatched {
                    token: u.token,
                    suggestion: u.suggestion.map(SymptomId::into_string),
                })
                .collect(),
        }
    }
}

/// FFI-safe unmatched token.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUnmatched {
    pub token: String,
    pub suggestion: Option<String>,
}

/// FFI-safe diagnosis result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiagnosis {
    pub disease: String,
    pub confidence_percent: f64,
    pub confidence_display: String,
    pub severity: String,
    pub urgency: String,
    pub action: String,
    pub recognized_symptoms: Vec<String>,
    pub alternatives: Vec<FfiCandidate>,
    pub needs_more_info: bool,
}

impl From<DiagnosisResult> for FfiDiagnosis {
    fn from(result: DiagnosisResult) -> Self {
        Self {
            confidence_display: result.confidence_display(),
            disease: result.disease,
            confidence_percent: result.confidence_percent,
            severity: result.severity.to_string(),
            urgency: result.urgency,
            action: result.action,
            recognized_symptoms: result
                .recognized_symptoms
                .into_iter()
                .map(SymptomId::into_string)
                .collect(),
            alternatives: result
                .alternative_diagnoses
                .into_iter()
                .map(|c| FfiCandidate {
                    label: c.label,
                    probability: c.probability,
                })
                .collect(),
            needs_more_info: result.needs_more_info,
        }
    }
}

/// FFI-safe diagnosis candidate.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCandidate {
    pub label: String,
    pub probability: f64,
}

/// FFI-safe transcript turn.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTurn {
    pub role: String,
    pub text: String,
    pub timestamp: String,
}
