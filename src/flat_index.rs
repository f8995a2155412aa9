//! Brute-force flat index over document weight rows — O(n) ranking

use crate::distance;
use crate::error::{Result, StoreError};
use crate::vector::SparseVector;
use serde::{Deserialize, Serialize};

/// A document-by-term weight matrix, one row per document in insertion order.
///
/// Every row lives in the same column space; search scores the query against
/// each row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    rows: Vec<SparseVector>,
}

impl FlatIndex {
    /// Create an empty index over a column space of the given size.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }

    /// Build an index from existing rows, checking that all share `dimension`.
    pub fn from_rows(dimension: usize, rows: Vec<SparseVector>) -> Result<Self> {
        let mut index = Self::new(dimension);
        for row in rows {
            index.push(row)?;
        }
        Ok(index)
    }

    /// Append a row.
    pub fn push(&mut self, row: SparseVector) -> Result<()> {
        if row.dimension() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: row.dimension(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Check that every row is well formed and lives in this index's column space.
    pub fn validate(&self) -> Result<()> {
        for (position, row) in self.rows.iter().enumerate() {
            if row.dimension() != self.dimension {
                return Err(StoreError::CorruptSnapshot {
                    reason: format!(
                        "row {} has dimension {}, expected {}",
                        position,
                        row.dimension(),
                        self.dimension
                    ),
                });
            }
            row.validate()?;
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity of `query` against every row, in row order.
    pub fn scores(&self, query: &SparseVector) -> Result<Vec<f32>> {
        if query.dimension() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            });
        }

        let dense = query.to_dense();
        let query_norm = query.norm();
        self.rows
            .iter()
            .map(|row| distance::cosine_similarity_dense(row, &dense, query_norm))
            .collect()
    }

    /// Rank every row against `query` and return the top `k` as
    /// `(position, score)` pairs, best first. Equal scores keep row order.
    pub fn search(&self, query: &SparseVector, k: usize) -> Result<Vec<(usize, f32)>> {
        let mut results: Vec<(usize, f32)> = self.scores(query)?.into_iter().enumerate().collect();

        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results.truncate(k);
        Ok(results)
    }
}
