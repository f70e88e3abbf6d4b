//! Exact Gram-Schmidt data of an integer basis.
//!
//! The values are derived from the integer Gram matrix `G = B * B^T` with the fraction-free
//! recurrence on the Gram determinants `d_i` and the scaled coefficients
//! `lambda[i][j] = d_{j+1} * mu[i][j]`, all of which are integers:
//!
//! ```text
//! u = G[i][j]
//! for l in 0..j:  u = (d_{l+1} * u - lambda[i][l] * lambda[j][l]) / d_l    (exact division)
//! lambda[i][j] = u  if j < i,   d_{i+1} = u  if j = i
//! ```
//!
//! so that `mu[i][j] = lambda[i][j] / d_{j+1}` and `||b*_i||^2 = d_{i+1} / d_i`. None of this
//! shares code or rounding with the floating-point cache it is compared against.

use alloc::vec::Vec;

use num::{BigInt, BigRational, Signed, ToPrimitive, Zero};

use super::LllError;
use crate::matrix::IntMatrix;

/// Gram-Schmidt coefficients and squared norms of an integer basis, held as exact integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactGramSchmidt {
    /// `d[0] = 1` and `d[i + 1]` is the Gram determinant of rows `0..=i`.
    gram_dets: Vec<BigInt>,
    lambda: Vec<Vec<BigInt>>,
}

impl ExactGramSchmidt {
    /// Computes the exact Gram-Schmidt data of `basis`.
    ///
    /// # Errors
    /// Returns [LllError::DegenerateBasis] if the rows of `basis` are linearly dependent.
    pub fn compute(basis: &IntMatrix) -> Result<Self, LllError> {
        let n = basis.num_rows();
        let gram: Vec<Vec<BigInt>> = (0..n)
            .map(|i| (0..=i).map(|j| integer_dot(basis.row(i), basis.row(j))).collect())
            .collect();

        let mut gram_dets = Vec::with_capacity(n + 1);
        gram_dets.push(BigInt::from(1));
        let mut lambda: Vec<Vec<BigInt>> = Vec::with_capacity(n);

        for i in 0..n {
            let mut row = Vec::with_capacity(i);
            for j in 0..=i {
                let mut u = gram[i][j].clone();
                for l in 0..j {
                    let lambda_jl = if j == i { &row[l] } else { &lambda[j][l] };
                    u = (&gram_dets[l + 1] * &u - &row[l] * lambda_jl) / &gram_dets[l];
                }
                if j < i {
                    row.push(u);
                } else {
                    if !u.is_positive() {
                        return Err(LllError::DegenerateBasis { row: i });
                    }
                    gram_dets.push(u);
                }
            }
            lambda.push(row);
        }

        Ok(Self { gram_dets, lambda })
    }

    /// Number of rows of the basis.
    pub fn num_rows(&self) -> usize {
        self.lambda.len()
    }

    /// Returns `mu[i][j]` for `j < i`, rounded to the nearest `f64`.
    pub fn mu(&self, i: usize, j: usize) -> f64 {
        ratio_to_f64(&self.lambda[i][j], &self.gram_dets[j + 1])
    }

    /// Returns `||b*_i||^2`, rounded to the nearest `f64`.
    pub fn norm_squared(&self, i: usize) -> f64 {
        ratio_to_f64(&self.gram_dets[i + 1], &self.gram_dets[i])
    }

    /// Returns the squared lattice volume, the Gram determinant of the whole basis.
    pub fn squared_volume(&self) -> &BigInt {
        &self.gram_dets[self.num_rows()]
    }
}

fn integer_dot(a: &[i64], b: &[i64]) -> BigInt {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| BigInt::from(i128::from(x) * i128::from(y)))
        .fold(BigInt::zero(), |acc, x| acc + x)
}

fn ratio_to_f64(numerator: &BigInt, denominator: &BigInt) -> f64 {
    BigRational::new_raw(numerator.clone(), denominator.clone())
        .to_f64()
        .unwrap_or(f64::NAN)
}
