//! Independent verification that an integer basis is LLL-reduced.

use num::Float;
use thiserror::Error;

use super::{GramSchmidt, LllError};
use crate::matrix::IntMatrix;

/// The first condition found to be violated by a basis that is not LLL-reduced.
#[derive(Debug, Error, PartialEq)]
pub enum ReductionViolation {
    /// A Gram-Schmidt coefficient exceeds 1/2 in absolute value.
    #[error("|mu[{row}][{column}]| = {value} exceeds 1/2")]
    NotSizeReduced { row: usize, column: usize, value: f64 },

    /// The Lovász condition fails between rows `row - 1` and `row`.
    #[error("lovasz condition fails at row {row}: {lhs} < {rhs}")]
    Lovasz { row: usize, lhs: f64, rhs: f64 },

    /// The Gram-Schmidt data could not be computed.
    #[error(transparent)]
    Malformed(#[from] LllError),
}

/// Re-derives the Gram-Schmidt data of `basis` from scratch and checks that it is
/// `delta`-LLL-reduced, allowing an absolute slack of `tolerance` on `|mu| <= 1/2` and a slack
/// of `tolerance` relative to `||b*_{k-1}||^2` on the Lovász condition.
///
/// # Errors
/// Returns the first violated condition, scanning rows in increasing order.
pub fn check_reduced(
    basis: &IntMatrix,
    delta: f64,
    tolerance: f64,
) -> Result<(), ReductionViolation> {
    if !basis.is_square() {
        return Err(LllError::NotSquare { rows: basis.num_rows(), cols: basis.num_cols() }.into());
    }
    let gso = GramSchmidt::compute(basis)?;

    for i in 1..basis.num_rows() {
        for j in 0..i {
            let value = gso.mu(i, j);
            if Float::abs(value) > 0.5 + tolerance {
                return Err(ReductionViolation::NotSizeReduced { row: i, column: j, value });
            }
        }

        let mu = gso.mu(i, i - 1);
        let previous = gso.norm_squared(i - 1);
        let lhs = gso.norm_squared(i);
        let rhs = (delta - mu * mu) * previous;
        if lhs < rhs - tolerance * previous {
            return Err(ReductionViolation::Lovasz { row: i, lhs, rhs });
        }
    }
    Ok(())
}
