//! Canonical symptom vocabulary.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matcher::normalize_symptom;

/// Catalog loading errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog entry {0} is blank")]
    BlankEntry(usize),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A normalized (trimmed, case-folded) symptom identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomId(String);

impl SymptomId {
    /// Normalize raw text into an identifier.
    pub fn new(raw: &str) -> Self {
        Self(normalize_symptom(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SymptomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, deduplicated list of canonical symptoms.
///
/// Position `i` is feature `i` of every encoded vector, so the order must be
/// the one the classifier was trained on. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<SymptomId>,
    positions: HashMap<SymptomId, usize>,
}

impl Catalog {
    /// Build a catalog from raw symptom names.
    ///
    /// Names are normalized; a repeated name keeps its first position.
    pub fn new<I, S>(names: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut positions = HashMap::new();

        for (raw_index, name) in names.into_iter().enumerate() {
            let id = SymptomId::new(name.as_ref());
            if id.as_str().is_empty() {
                return Err(CatalogError::BlankEntry(raw_index));
            }
            if positions.contains_key(&id) {
                warn!(symptom = %id, "duplicate catalog entry ignored");
                continue;
            }
            positions.insert(id.clone(), entries.len());
            entries.push(id);
        }

        Ok(Self { entries, positions })
    }

    /// Parse a catalog from a JSON array of strings.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::new(names)
    }

    /// Load a catalog artifact file.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            entries = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            "loaded symptom catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in feature order.
    pub fn entries(&self) -> &[SymptomId] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomId> {
        self.entries.iter()
    }

    /// Feature position of a symptom.
    pub fn position(&self, id: &SymptomId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &SymptomId) -> bool {
        self.positions.contains_key(id)
    }

    /// Look up the catalog entry for raw text, if any.
    pub fn lookup(&self, raw: &str) -> Option<&SymptomId> {
        let id = SymptomId::new(raw);
        self.position(&id).map(|i| &self.entries[i])
    }

    /// SHA-256 over the ordered entries, hex-encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
