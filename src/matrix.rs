//! Dense row-major matrices for regression design matrices and
//! contingency tables.
//!
//! Only the operations the engine needs: transpose, multiply, and
//! Gauss-Jordan inversion with partial pivoting. Inversion reports
//! singular input as [`StatsError::SingularMatrix`] instead of letting
//! NaN or infinity leak into the result.
//!
//! # Examples
//! ```
//! use u_statkit::matrix::Matrix;
//!
//! let a = Matrix::from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
//! let inv = a.inverse().unwrap();
//! let id = a.multiply(&inv).unwrap();
//! assert!((id.get(0, 0) - 1.0).abs() < 1e-12);
//! assert!(id.get(0, 1).abs() < 1e-12);
//! ```

use serde::Serialize;

use crate::error::{StatsError, StatsResult};

/// Pivots at or below this fraction of the largest entry count as zero.
const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Rectangular, non-empty matrix of `f64` stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from a slice of rows.
    ///
    /// # Errors
    /// - [`StatsError::EmptyInput`] if there are no rows or the first row is empty.
    /// - [`StatsError::RaggedMatrix`] if any row differs in length from the first.
    pub fn from_rows(rows: &[Vec<f64>]) -> StatsResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(StatsError::EmptyInput);
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(StatsError::RaggedMatrix {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Builds a matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> StatsResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(StatsError::EmptyInput);
        }
        if data.len() != rows * cols {
            return Err(StatsError::LengthMismatch {
                left: data.len(),
                right: rows * cols,
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds an n×1 column matrix.
    pub fn column(values: &[f64]) -> StatsResult<Self> {
        Self::from_vec(values.len(), 1, values.to_vec())
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at `(i, j)`. Panics if out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        self.data[i * self.cols + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows_iter().map(<[f64]>::to_vec).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        t
    }

    /// Matrix product `self · other` by the triple loop.
    ///
    /// # Errors
    /// [`StatsError::DimensionMismatch`] unless `self.ncols() == other.nrows()`.
    pub fn multiply(&self, other: &Matrix) -> StatsResult<Matrix> {
        if self.cols != other.rows {
            return Err(self.mismatch(other));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out.data[i * other.cols + j] += a * other.data[k * other.cols + j];
                }
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self · v`.
    pub fn mul_vec(&self, v: &[f64]) -> StatsResult<Vec<f64>> {
        if self.cols != v.len() {
            return Err(StatsError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: v.len(),
                right_cols: 1,
            });
        }
        Ok(self
            .rows_iter()
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Inverse by Gauss-Jordan elimination on `[A | I]`.
    ///
    /// # Algorithm
    /// 1. Forward elimination with partial pivoting: for each column pick
    ///    the row with the largest magnitude at or below the diagonal.
    /// 2. Back substitution clears the entries above each pivot.
    /// 3. Each row is divided by its pivot.
    ///
    /// # Errors
    /// - [`StatsError::NotSquare`] for non-square input.
    /// - [`StatsError::SingularMatrix`] when a pivot is at or below
    ///   `1e-12 × max|aᵢⱼ|`.
    ///
    /// # Complexity
    /// Time: O(n³), Space: O(n²)
    pub fn inverse(&self) -> StatsResult<Matrix> {
        if !self.is_square() {
            return Err(StatsError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        let w = 2 * n;
        let scale = self.data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return Err(StatsError::SingularMatrix);
        }
        let tol = SINGULARITY_TOLERANCE * scale;

        let mut aug = vec![0.0; n * w];
        for i in 0..n {
            aug[i * w..i * w + n].copy_from_slice(self.row(i));
            aug[i * w + n + i] = 1.0;
        }

        // Forward elimination
        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&a, &b| aug[a * w + col].abs().total_cmp(&aug[b * w + col].abs()))
                .unwrap_or(col);
            let pivot = aug[pivot_row * w + col];
            if pivot.abs() <= tol {
                tracing::debug!(col, pivot, "singular matrix during elimination");
                return Err(StatsError::SingularMatrix);
            }
            if pivot_row != col {
                for j in 0..w {
                    aug.swap(col * w + j, pivot_row * w + j);
                }
            }
            for r in col + 1..n {
                let factor = aug[r * w + col] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in col..w {
                    aug[r * w + j] -= factor * aug[col * w + j];
                }
            }
        }

        // Back substitution
        for col in (0..n).rev() {
            let pivot = aug[col * w + col];
            for r in 0..col {
                let factor = aug[r * w + col] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in col..w {
                    aug[r * w + j] -= factor * aug[col * w + j];
                }
            }
        }

        // Normalisation
        let mut inv = Matrix::zeros(n, n);
        for i in 0..n {
            let pivot = aug[i * w + i];
            for j in 0..n {
                inv.data[i * n + j] = aug[i * w + n + j] / pivot;
            }
        }
        tracing::trace!(n, "inverted matrix");
        Ok(inv)
    }

    fn mismatch(&self, other: &Matrix) -> StatsError {
        StatsError::DimensionMismatch {
            left_rows: self.rows,
            left_cols: self.cols,
            right_rows: other.rows,
            right_cols: other.cols,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn diagonally_dominant_inverse_roundtrip(
            n in 1_usize..6,
            seed in proptest::collection::vec(-1.0_f64..1.0, 36),
        ) {
            let mut m = Matrix::zeros(n, n);
            for i in 0..n {
                for j in 0..n {
                    m.set(i, j, seed[i * 6 + j]);
                }
                m.set(i, i, m.get(i, i) + n as f64 + 1.0);
            }
            let inv = m.inverse().unwrap();
            let prod = m.multiply(&inv).unwrap();
            for i in 0..n {
                for j in 0..n {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    prop_assert!((prod.get(i, j) - expected).abs() < 1e-10);
                }
            }
        }

        #[test]
        fn transpose_of_product(
            a in proptest::collection::vec(-10.0_f64..10.0, 6),
            b in proptest::collection::vec(-10.0_f64..10.0, 6),
        ) {
            let a = Matrix::from_vec(2, 3, a).unwrap();
            let b = Matrix::from_vec(3, 2, b).unwrap();
            let lhs = a.multiply(&b).unwrap().transpose();
            let rhs = b.transpose().multiply(&a.transpose()).unwrap();
            for (x, y) in lhs.as_slice().iter().zip(rhs.as_slice()) {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
