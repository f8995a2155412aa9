//! Similarity measures between weight vectors

use crate::error::{Result, StoreError};
use crate::vector::SparseVector;
use ndarray::Array1;
use std::cmp::Ordering;

/// Dot product of two sparse vectors of the same dimension
pub fn dot_product(v1: &SparseVector, v2: &SparseVector) -> Result<f32> {
    check_dimension(v1.dimension(), v2.dimension())?;

    let mut a = v1.iter();
    let mut b = v2.iter();
    let (mut left, mut right) = (a.next(), b.next());
    let mut sum = 0.0;
    while let (Some((i, x)), Some((j, y))) = (left, right) {
        match i.cmp(&j) {
            Ordering::Equal => {
                sum += x * y;
                left = a.next();
                right = b.next();
            }
            Ordering::Less => left = a.next(),
            Ordering::Greater => right = b.next(),
        }
    }
    Ok(sum)
}

/// Dot product of a sparse row against a dense vector
pub fn dot_dense(row: &SparseVector, dense: &Array1<f32>) -> Result<f32> {
    check_dimension(row.dimension(), dense.len())?;
    Ok(row.iter().map(|(col, value)| value * dense[col]).sum())
}

/// Cosine similarity of a sparse row against a dense query with a
/// precomputed norm.
///
/// Defined as 0 when either vector has zero magnitude. Term weights are
/// non-negative, so the result is clamped to `[0, 1]` to absorb rounding.
pub fn cosine_similarity_dense(
    row: &SparseVector,
    query: &Array1<f32>,
    query_norm: f32,
) -> Result<f32> {
    let dot = dot_dense(row, query)?;
    Ok(normalize_score(dot, row.norm(), query_norm))
}

fn normalize_score(dot: f32, norm1: f32, norm2: f32) -> f32 {
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }
    (dot / (norm1 * norm2)).clamp(0.0, 1.0)
}

fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(StoreError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sparse(dim: usize, pairs: &[(u32, f32)]) -> SparseVector {
        SparseVector::from_pairs(dim, pairs.to_vec()).unwrap()
    }

    #[test]
    fn test_dot_product() {
        let v1 = sparse(4, &[(0, 1.0), (1, 2.0), (3, 3.0)]);
        let v2 = sparse(4, &[(1, 4.0), (2, 5.0), (3, 6.0)]);
        assert_relative_eq!(dot_product(&v1, &v2).unwrap(), 26.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dot_dense() {
        let row = sparse(3, &[(0, 2.0), (2, 1.0)]);
        let dense = array![1.0, 7.0, 3.0];
        assert_relative_eq!(dot_dense(&row, &dense).unwrap(), 5.0, epsilon = 1e-6);
    }

    fn cosine(row: &SparseVector, query: &SparseVector) -> f32 {
        cosine_similarity_dense(row, &query.to_dense(), query.norm()).unwrap()
    }

    #[test]
    fn test_cosine_identical() {
        let v = sparse(3, &[(0, 1.0), (2, 2.0)]);
        assert_relative_eq!(cosine(&v, &v), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let v1 = sparse(3, &[(0, 1.0)]);
        let v2 = sparse(3, &[(1, 1.0)]);
        assert_relative_eq!(cosine(&v1, &v2), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let v1 = SparseVector::zeros(3);
        let v2 = sparse(3, &[(1, 1.0)]);
        assert_eq!(cosine(&v1, &v2), 0.0);
        assert_eq!(cosine(&v2, &v1), 0.0);
    }

    #[test]
    fn test_cosine_dense_matches_dot_over_norms() {
        let row = sparse(4, &[(0, 0.3), (1, 0.4), (3, 0.5)]);
        let query = sparse(4, &[(1, 1.0), (3, 2.0)]);
        let expected = dot_product(&row, &query).unwrap() / (row.norm() * query.norm());
        assert_relative_eq!(cosine(&row, &query), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let v1 = sparse(2, &[(0, 1.0)]);
        let v2 = sparse(3, &[(0, 1.0)]);
        assert!(matches!(
            dot_product(&v1, &v2),
            Err(StoreError::DimensionMismatch { .. })
        ));
    }
}
