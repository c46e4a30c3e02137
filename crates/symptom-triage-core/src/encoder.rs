//! Binary feature encoding over the catalog.

use thiserror::Error;

use crate::models::{Catalog, SymptomId};

/// Encoding errors. These are configuration bugs, never user errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Cannot encode against an empty catalog")]
    EmptyCatalog,

    #[error("Symptom is not in the catalog: {0}")]
    UnknownSymptom(String),

    #[error("Vector has {actual} positions, catalog has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type EncodingResult<T> = Result<T, EncodingError>;

/// Fixed-length 0/1 vector; position `i` is set iff catalog entry `i` is active.
///
/// Only [`encode`] builds one, so no other values can appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVector(Vec<u8>);

impl SymptomVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of set positions.
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&bit| bit != 0).count()
    }

    /// Indices of set positions, ascending.
    pub fn active_positions(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit != 0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Encode a symptom set against the catalog.
pub fn encode<'a, I>(symptoms: I, catalog: &Catalog) -> EncodingResult<SymptomVector>
where
    I: IntoIterator<Item = &'a SymptomId>,
{
    if catalog.is_empty() {
        return Err(EncodingError::EmptyCatalog);
    }

    let mut bits = vec![0u8; catalog.len()];
    for symptom in symptoms {
        let position = catalog
            .position(symptom)
            .ok_or_else(|| EncodingError::UnknownSymptom(symptom.to_string()))?;
        bits[position] = 1;
    }

    Ok(SymptomVector(bits))
}

/// Recover the active symptoms of a vector, in catalog order.
pub fn decode(vector: &SymptomVector, catalog: &Catalog) -> EncodingResult<Vec<SymptomId>> {
    if vector.len() != catalog.len() {
        return Err(EncodingError::LengthMismatch {
            expected: catalog.len(),
            actual: vector.len(),
        });
    }

    Ok(vector
        .active_positions()
        .into_iter()
        .map(|i| catalog.entries()[i].clone())
        .collect())
}
