//! Serialization utilities: bincode for the store snapshot.

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::flat_index::FlatIndex;
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};

/// Serializable representation of the full store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub documents: Vec<Document>,
    pub vectorizer: TfidfVectorizer,
    pub matrix: FlatIndex,
    /// Set when documents were appended after the last full fit.
    pub stale: bool,
}

impl StoreSnapshot {
    /// Check the structural invariants a loaded snapshot must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.matrix.len() != self.documents.len() {
            return Err(StoreError::CorruptSnapshot {
                reason: format!(
                    "{} matrix rows for {} documents",
                    self.matrix.len(),
                    self.documents.len()
                ),
            });
        }
        if !self.documents.is_empty() && !self.vectorizer.is_fitted() {
            return Err(StoreError::CorruptSnapshot {
                reason: "documents present but vectorizer is not fitted".to_string(),
            });
        }
        if self.matrix.dimension() != self.vectorizer.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: self.vectorizer.dimension(),
                actual: self.matrix.dimension(),
            });
        }
        if let Some(idf) = self.vectorizer.idf() {
            if idf.len() != self.vectorizer.dimension() {
                return Err(StoreError::DimensionMismatch {
                    expected: self.vectorizer.dimension(),
                    actual: idf.len(),
                });
            }
        }
        self.matrix.validate()
    }
}

/// Encode data to bincode bytes.
pub fn to_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::SerializationError(e.to_string()))
}

/// Decode data from bincode bytes.
pub fn from_bincode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::SerializationError(e.to_string()))
}
