//! Sparse weight vector type and operations

use crate::error::{Result, StoreError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A sparse vector over the vocabulary column space.
///
/// Entries are kept sorted by column with no duplicates and no explicit zeros.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Create an all-zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a vector from `(column, value)` pairs.
    ///
    /// Pairs may arrive in any order; duplicate columns are summed.
    pub fn from_pairs(dimension: usize, mut pairs: Vec<(u32, f32)>) -> Result<Self> {
        if let Some(&(col, _)) = pairs.iter().find(|(col, _)| *col as usize >= dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: col as usize + 1,
            });
        }

        pairs.sort_by_key(|&(col, _)| col);
        let mut indices: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (col, value) in pairs {
            match indices.last() {
                Some(&last) if last == col => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(col);
                    values.push(value);
                }
            }
        }

        let mut v = Self {
            dimension,
            indices,
            values,
        };
        v.prune_zeros();
        Ok(v)
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.values.len() {
            if self.values[i] != 0.0 {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored non-zero entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| (i as usize, v))
    }

    /// Check the layout invariants of a vector that did not come from
    /// [`from_pairs`](Self::from_pairs), e.g. one read back from disk.
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() != self.values.len() {
            return Err(StoreError::CorruptSnapshot {
                reason: format!(
                    "{} indices for {} values",
                    self.indices.len(),
                    self.values.len()
                ),
            });
        }
        let mut previous: Option<u32> = None;
        for &col in &self.indices {
            if col as usize >= self.dimension {
                return Err(StoreError::CorruptSnapshot {
                    reason: format!("column {} out of range for dimension {}", col, self.dimension),
                });
            }
            if previous.map_or(false, |p| p >= col) {
                return Err(StoreError::CorruptSnapshot {
                    reason: format!("column {} out of order", col),
                });
            }
            previous = Some(col);
        }
        Ok(())
    }

    /// Compute the L2 norm (magnitude) of the vector
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize the vector to unit length. A zero vector stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            return;
        }
        for x in &mut self.values {
            *x /= norm;
        }
    }

    /// Scale each entry by the weight of its column
    pub fn scale_columns(&mut self, weights: &Array1<f32>) -> Result<()> {
        if weights.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: weights.len(),
            });
        }
        for (col, value) in self.indices.iter().zip(self.values.iter_mut()) {
            *value *= weights[*col as usize];
        }
        self.prune_zeros();
        Ok(())
    }

    /// Expand into a dense array
    pub fn to_dense(&self) -> Array1<f32> {
        let mut dense = Array1::zeros(self.dimension);
        for (col, value) in self.iter() {
            dense[col] = value;
        }
        dense
    }
}
