//! Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::DEFAULT_SUGGESTION_MIN_SIMILARITY;

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Welcome text shown when a consultation starts.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi, I'm your symptom checker. Tell me what symptoms \
     you have (for example 'fever, cough, headache') and ask for a diagnosis when you're ready. \
     This is not a medical diagnosis; always consult a doctor for confirmation.";

/// Tunable behavior of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageSettings {
    /// Minimum similarity for unmatched-token suggestions
    pub suggestion_min_similarity: f64,
    pub welcome_message: String,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            suggestion_min_similarity: DEFAULT_SUGGESTION_MIN_SIMILARITY,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

/// Where the artifacts live and how to use them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// JSON array of symptom names, in model feature order
    pub catalog_path: PathBuf,
    /// JSON model artifact
    pub model_path: PathBuf,
    /// JSON advice table; the built-in table is used when absent
    #[serde(default)]
    pub advice_path: Option<PathBuf>,
    #[serde(default)]
    pub settings: TriageSettings,
}

impl EngineConfig {
    pub fn new(catalog_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            model_path: model_path.into(),
            advice_path: None,
            settings: TriageSettings::default(),
        }
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file. Relative artifact paths resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&json)?;
        if let Some(base) = path.parent() {
            config.catalog_path = base.join(&config.catalog_path);
            config.model_path = base.join(&config.model_path);
            config.advice_path = config.advice_path.map(|p| base.join(p));
        }
        Ok(config)
    }
}
