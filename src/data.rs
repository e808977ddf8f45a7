//! Training data containers and the small reductions the renderer needs.
//!
//! Column extents and node means go through trueno's SIMD reductions.

use trueno::Vector;

use crate::error::{Error, Result};

/// Dense row-major feature matrix (`n_rows` samples by `n_cols` features).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Wrap a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `data.len() != n_rows * n_cols`.
    pub fn new(data: Vec<f32>, n_rows: usize, n_cols: usize) -> Result<Self> {
        let expected = n_rows * n_cols;
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                what: "matrix elements",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, n_rows, n_cols })
    }

    /// Build from rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] on ragged rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(Error::ShapeMismatch {
                    what: "row length",
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, n_rows: rows.len(), n_cols })
    }

    /// Number of samples.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of features.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Whether the matrix has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Value at `(row, col)`. Panics when out of bounds, like slice indexing.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(col < self.n_cols, "column {col} out of bounds ({})", self.n_cols);
        self.data[row * self.n_cols + col]
    }

    /// One sample as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Copy of one feature column.
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<f32> {
        (0..self.n_rows).map(|r| self.get(r, col)).collect()
    }

    /// Values of one feature for a subset of rows.
    #[must_use]
    pub fn column_subset(&self, col: usize, rows: &[usize]) -> Vec<f32> {
        rows.iter().map(|&r| self.get(r, col)).collect()
    }

    /// Global `(min, max)` of a feature over every sample.
    #[must_use]
    pub fn column_range(&self, col: usize) -> Option<(f32, f32)> {
        value_range(&self.column(col))
    }
}

/// `(min, max)` of the values, `None` when empty.
#[must_use]
pub fn value_range(values: &[f32]) -> Option<(f32, f32)> {
    if values.is_empty() {
        return None;
    }
    let v = Vector::from_vec(values.to_vec());
    Some((v.min().ok()?, v.max().ok()?))
}

/// Arithmetic mean, `None` when empty.
#[must_use]
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let sum = Vector::from_vec(values.to_vec()).sum().ok()?;
    Some(sum / values.len() as f32)
}

/// Gather `values[i]` for each index.
#[must_use]
pub fn select(values: &[f32], indices: &[usize]) -> Vec<f32> {
    indices.iter().map(|&i| values[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> FeatureMatrix {
        FeatureMatrix::from_rows(&[[1.0, 10.0], [2.0, 20.0], [3.0, 5.0]]).unwrap()
    }

    #[test]
    fn test_new_checks_length() {
        assert!(FeatureMatrix::new(vec![0.0; 6], 2, 3).is_ok());
        let err = FeatureMatrix::new(vec![0.0; 5], 2, 3).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 6, actual: 5, .. }));
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(FeatureMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_accessors() {
        let m = sample();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[2.0, 20.0]);
        assert_eq!(m.column(1), vec![10.0, 20.0, 5.0]);
        assert_eq!(m.column_subset(0, &[2, 0]), vec![3.0, 1.0]);
        assert_relative_eq!(m.get(2, 1), 5.0);
    }

    #[test]
    fn test_column_range() {
        let m = sample();
        assert_eq!(m.column_range(1), Some((5.0, 20.0)));
    }

    #[test]
    fn test_empty_matrix() {
        let rows: Vec<[f32; 2]> = Vec::new();
        let m = FeatureMatrix::from_rows(&rows).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.column_range(0), None);
    }

    #[test]
    fn test_mean_and_range() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 6.0]).unwrap(), 3.0);
        assert_eq!(mean(&[]), None);
        assert_eq!(value_range(&[4.0, -1.0, 2.0]), Some((-1.0, 4.0)));
    }

    #[test]
    fn test_select() {
        assert_eq!(select(&[5.0, 6.0, 7.0], &[2, 2, 0]), vec![7.0, 7.0, 5.0]);
    }
}
