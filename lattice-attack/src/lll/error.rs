use thiserror::Error;

use crate::matrix::MatrixError;

/// Errors that abort a basis reduction.
///
/// All of them are fatal: either the input basis violates a precondition (it is not square,
/// too small, rank deficient, or grows beyond the integer range) or the floating-point
/// Gram-Schmidt data can no longer be trusted.
#[derive(Debug, Error, PartialEq)]
pub enum LllError {
    /// The basis does not have as many rows as columns.
    #[error("basis must be square but has {rows} rows and {cols} columns")]
    NotSquare { rows: usize, cols: usize },

    /// The basis has fewer than two rows.
    #[error("basis dimension {0} is too small, at least 2 is required")]
    TooSmall(usize),

    /// A Gram-Schmidt vector has zero norm, so the basis is not full rank.
    #[error("basis is rank deficient: gram-schmidt vector {row} has zero norm")]
    DegenerateBasis { row: usize },

    /// Gram-Schmidt data for a row is NaN or infinite.
    #[error("gram-schmidt data for row {row} is not finite")]
    NonFinite { row: usize },

    /// Size-reducing a row would overflow the `i64` entries of the basis.
    #[error("size reduction of row {row} overflows the integer range")]
    CoefficientOverflow { row: usize },

    /// A cached Gram-Schmidt value disagrees with the exact value derived from the integer basis.
    #[error(
        "gram-schmidt value at ({row}, {column}) drifted: cached {cached}, recomputed {recomputed}"
    )]
    NumericDrift {
        row: usize,
        /// Column of the drifting `mu` entry, or `row` itself for a squared norm.
        column: usize,
        cached: f64,
        recomputed: f64,
    },

    /// Size reduction of a row kept finding coefficients above 1/2.
    #[error("size reduction of row {row} did not converge after {sweeps} sweeps")]
    SizeReductionStalled { row: usize, sweeps: usize },

    /// The configured iteration budget ran out before the basis was reduced.
    #[error("reduction did not finish within {0} iterations")]
    IterationBudgetExhausted(u64),

    /// The input could not be turned into an integer basis.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
