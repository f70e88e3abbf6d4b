//! Dense integer matrices used as lattice bases.
//!
//! Rows are lattice vectors. Entries are exact `i64` values; every in-place update made by the
//! reduction engine goes through checked arithmetic so that an overflowing basis is reported
//! instead of silently wrapping.

use alloc::vec::Vec;
use core::fmt;

use num::{BigInt, One, Zero};
use thiserror::Error;

// ERRORS
// ================================================================================================

/// Errors that can occur when constructing or combining integer matrices.
#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    /// The matrix has no rows or no columns.
    #[error("matrix must have at least one row and one column")]
    Empty,

    /// A row has a different length than the first row.
    #[error("row {row} has {actual} entries but {expected} were expected")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// An `f64` entry is not an exactly representable integer.
    #[error("entry ({row}, {column}) = {value} is not an integer")]
    NonIntegerEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The rejected value.
        value: f64,
    },

    /// Operand shapes are incompatible.
    #[error("cannot combine a {left_rows}x{left_cols} matrix with a {right_rows}x{right_cols} one")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    /// An exact row update or product would overflow `i64`.
    #[error("updating row {row} overflows the integer range")]
    Overflow {
        /// Row that was being updated, or the row of the product being computed.
        row: usize,
    },
}

// INTEGER MATRIX
// ================================================================================================

/// A row-major matrix of `i64` entries.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IntMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl IntMatrix {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Returns a `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0; rows * cols] }
    }

    /// Returns the `n x n` matrix `value * I`.
    pub fn scalar(n: usize, value: i64) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.set(i, i, value);
        }
        matrix
    }

    /// Returns the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::scalar(n, 1)
    }

    /// Builds a matrix from a list of equally long rows.
    ///
    /// # Errors
    /// Returns an error if there are no rows, the rows are empty, or the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(MatrixError::Empty);
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRow { row: i, expected: cols, actual: row.len() });
            }
            data.extend_from_slice(row);
        }

        Ok(Self { rows: rows.len(), cols, data })
    }

    /// Builds a matrix from floating-point rows whose entries must all be exact integers.
    ///
    /// # Errors
    /// Returns an error if an entry is not finite, has a fractional part, or does not fit into
    /// `i64`, in addition to the shape errors of [IntMatrix::from_rows].
    pub fn try_from_f64_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let mut converted = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (j, &value) in row.iter().enumerate() {
                // 2^63 is exactly representable, anything at or above it is out of range
                let in_range =
                    (-9.223_372_036_854_776e18..9.223_372_036_854_776e18).contains(&value);
                if !value.is_finite() || !in_range || num::Float::fract(value) != 0.0 {
                    return Err(MatrixError::NonIntegerEntry { row: i, column: j, value });
                }
                out.push(value as i64);
            }
            converted.push(out);
        }
        Self::from_rows(converted)
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns the entry at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    /// Sets the entry at (`row`, `col`).
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row * self.cols + col] = value;
    }

    /// Returns row `i` as a slice.
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Returns row `i` as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [i64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[i64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Returns the rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.rows().map(<[i64]>::to_vec).collect()
    }

    /// Returns the squared Euclidean norm of row `i`, computed exactly.
    pub fn row_norm_squared(&self, i: usize) -> i128 {
        self.row(i).iter().map(|&x| i128::from(x) * i128::from(x)).sum()
    }

    // MUTATORS
    // --------------------------------------------------------------------------------------------

    /// Swaps rows `i` and `j`.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.data.split_at_mut(hi * self.cols);
        head[lo * self.cols..(lo + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
    }

    /// Replaces row `target` with `row[target] - factor * row[source]`.
    ///
    /// The update is all-or-nothing: if any entry would overflow, the matrix is left untouched.
    ///
    /// # Errors
    /// Returns [MatrixError::Overflow] if any updated entry does not fit into `i64`.
    pub fn sub_row_multiple(
        &mut self,
        target: usize,
        source: usize,
        factor: i64,
    ) -> Result<(), MatrixError> {
        debug_assert_ne!(target, source);
        let updated: Option<Vec<i64>> = self
            .row(target)
            .iter()
            .zip(self.row(source))
            .map(|(&t, &s)| s.checked_mul(factor).and_then(|p| t.checked_sub(p)))
            .collect();
        let updated = updated.ok_or(MatrixError::Overflow { row: target })?;
        self.row_mut(target).copy_from_slice(&updated);
        Ok(())
    }

    /// Copies `block` into this matrix with its top-left corner at (`row`, `col`).
    pub fn set_block(&mut self, row: usize, col: usize, block: &IntMatrix) {
        debug_assert!(row + block.rows <= self.rows && col + block.cols <= self.cols);
        for (i, src) in block.rows().enumerate() {
            self.row_mut(row + i)[col..col + block.cols].copy_from_slice(src);
        }
    }

    // ARITHMETIC
    // --------------------------------------------------------------------------------------------

    /// Returns the transpose of this matrix.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    /// Returns `self * x` for a column vector `x`.
    ///
    /// # Errors
    /// Returns an error if `x` does not have one entry per column, or if an entry of the result
    /// does not fit into `i64`.
    pub fn mul_vec(&self, x: &[i64]) -> Result<Vec<i64>, MatrixError> {
        if x.len() != self.cols {
            return Err(MatrixError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: x.len(),
                right_cols: 1,
            });
        }
        self.rows()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .zip(x)
                    .try_fold(0_i64, |acc, (&a, &b)| a.checked_mul(b)?.checked_add(acc))
                    .ok_or(MatrixError::Overflow { row: i })
            })
            .collect()
    }

    /// Returns the matrix product `self * rhs`.
    ///
    /// # Errors
    /// Returns an error if the inner dimensions differ, or if an entry of the product does not
    /// fit into `i64`.
    pub fn mul(&self, rhs: &IntMatrix) -> Result<IntMatrix, MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: rhs.rows,
                right_cols: rhs.cols,
            });
        }
        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for (l, &a) in self.row(i).iter().enumerate() {
                if a == 0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    let v = a
                        .checked_mul(rhs.get(l, j))
                        .and_then(|p| p.checked_add(out.get(i, j)))
                        .ok_or(MatrixError::Overflow { row: i })?;
                    out.set(i, j, v);
                }
            }
        }
        Ok(out)
    }

    /// Computes the exact determinant with fraction-free (Bareiss) elimination.
    ///
    /// # Errors
    /// Returns an error if the matrix is not square.
    pub fn determinant(&self) -> Result<BigInt, MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: self.cols,
                right_cols: self.rows,
            });
        }
        let n = self.rows;
        let mut m: Vec<Vec<BigInt>> =
            self.rows().map(|row| row.iter().map(|&x| BigInt::from(x)).collect()).collect();
        let mut negate = false;
        let mut prev_pivot = BigInt::one();

        for k in 0..n.saturating_sub(1) {
            if m[k][k].is_zero() {
                match (k + 1..n).find(|&i| !m[i][k].is_zero()) {
                    Some(i) => {
                        m.swap(i, k);
                        negate = !negate;
                    },
                    None => return Ok(BigInt::zero()),
                }
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let value = (&m[i][j] * &m[k][k] - &m[i][k] * &m[k][j]) / &prev_pivot;
                    m[i][j] = value;
                }
            }
            prev_pivot = m[k][k].clone();
        }

        let det = m[n - 1][n - 1].clone();
        Ok(if negate { -det } else { det })
    }
}

impl fmt::Debug for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row:?}")?;
        }
        Ok(())
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn matrix(rows: &[&[i64]]) -> IntMatrix {
        IntMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn from_rows_rejects_bad_shapes() {
        assert_matches!(IntMatrix::from_rows(vec![]), Err(MatrixError::Empty));
        assert_matches!(IntMatrix::from_rows(vec![vec![]]), Err(MatrixError::Empty));
        assert_matches!(
            IntMatrix::from_rows(vec![vec![1, 2], vec![3]]),
            Err(MatrixError::RaggedRow { row: 1, expected: 2, actual: 1 })
        );
    }

    #[test]
    fn f64_rows_must_be_integral() {
        let ok = IntMatrix::try_from_f64_rows(&[vec![1.0, -2.0], vec![0.0, 3.0]]).unwrap();
        assert_eq!(ok, matrix(&[&[1, -2], &[0, 3]]));

        assert_matches!(
            IntMatrix::try_from_f64_rows(&[vec![1.0, 0.5]]),
            Err(MatrixError::NonIntegerEntry { row: 0, column: 1, .. })
        );
        assert_matches!(
            IntMatrix::try_from_f64_rows(&[vec![f64::INFINITY]]),
            Err(MatrixError::NonIntegerEntry { row: 0, column: 0, .. })
        );
    }

    #[test]
    fn swap_and_row_update() {
        let mut m = matrix(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        m.swap_rows(2, 0);
        assert_eq!(m, matrix(&[&[7, 8, 9], &[4, 5, 6], &[1, 2, 3]]));

        m.sub_row_multiple(1, 2, 4).unwrap();
        assert_eq!(m.row(1), &[0, -3, -6]);
    }

    #[test]
    fn row_update_overflow_leaves_matrix_untouched() {
        let mut m = matrix(&[&[i64::MIN + 1, 0], &[1, 1]]);
        let before = m.clone();
        assert_matches!(m.sub_row_multiple(0, 1, 2), Err(MatrixError::Overflow { row: 0 }));
        assert_eq!(m, before);
    }

    #[test]
    fn transpose_and_products() {
        let a = matrix(&[&[1, 2], &[3, 4], &[5, 6]]);
        assert_eq!(a.transpose(), matrix(&[&[1, 3, 5], &[2, 4, 6]]));
        assert_eq!(a.mul_vec(&[1, -1]).unwrap(), vec![-1, -1, -1]);

        let product = a.transpose().mul(&a).unwrap();
        assert_eq!(product, matrix(&[&[35, 44], &[44, 56]]));
        assert_matches!(a.mul(&a), Err(MatrixError::DimensionMismatch { .. }));
    }

    #[test]
    fn products_report_overflow() {
        let big = matrix(&[&[1, 0], &[i64::MAX / 2 + 1, 1]]);
        let double_first = matrix(&[&[2, 0], &[0, 1]]);
        assert_matches!(big.mul(&double_first), Err(MatrixError::Overflow { row: 1 }));
        assert_matches!(big.mul_vec(&[2, 0]), Err(MatrixError::Overflow { row: 1 }));

        // the partial sums overflow although every single product fits
        let wide = matrix(&[&[i64::MAX, 1]]);
        assert_matches!(wide.mul_vec(&[1, 1]), Err(MatrixError::Overflow { row: 0 }));
        assert_matches!(wide.mul(&matrix(&[&[1], &[1]])), Err(MatrixError::Overflow { row: 0 }));
    }

    #[test]
    fn determinant_matches_known_values() {
        assert_eq!(IntMatrix::identity(5).determinant().unwrap(), BigInt::one());
        assert_eq!(IntMatrix::scalar(3, 7).determinant().unwrap(), BigInt::from(343));
        assert_eq!(matrix(&[&[0, 1], &[1, 0]]).determinant().unwrap(), BigInt::from(-1));
        assert_eq!(
            matrix(&[&[2, -3, 1], &[2, 0, -1], &[1, 4, 5]]).determinant().unwrap(),
            BigInt::from(49)
        );
        assert_eq!(matrix(&[&[1, 2], &[2, 4]]).determinant().unwrap(), BigInt::zero());
    }

    #[test]
    fn set_block_places_entries() {
        let mut m = IntMatrix::zeros(3, 4);
        m.set_block(1, 2, &IntMatrix::scalar(2, 9));
        assert_eq!(m.row(0), &[0, 0, 0, 0]);
        assert_eq!(m.row(1), &[0, 0, 9, 0]);
        assert_eq!(m.row(2), &[0, 0, 0, 9]);
    }
}
