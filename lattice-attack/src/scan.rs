//! Extraction of secret candidates from a reduced primal basis.
//!
//! After reduction the embedded target `(-e, s, 1)` (or its negation) is expected among the
//! shortest rows of the basis. The scanner orders rows by norm, looks at a small window of the
//! shortest ones, and turns every row whose last coordinate is `+1` or `-1` into a candidate
//! secret taken from the middle `kn` coordinates.

use alloc::vec::Vec;

use num::Float;

use crate::{
    keygen::PublicKey,
    matrix::{IntMatrix, MatrixError},
    params::RingParams,
    ring::RingElement,
};

// CONSTANTS
// ================================================================================================

/// The default number of shortest rows inspected.
pub const DEFAULT_SCAN_WINDOW: usize = 10;

/// The default Euclidean norm below which a non-matching row is reported as suspicious.
pub const DEFAULT_SUSPICIOUS_THRESHOLD: f64 = 20.0;

// CONFIG
// ================================================================================================

/// Options of the candidate scanner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    window: usize,
    suspicious_threshold: f64,
}

impl ScanConfig {
    /// Number of shortest rows inspected. Rows tied in norm with the last row of the window are
    /// inspected as well.
    ///
    /// Defaults to [`DEFAULT_SCAN_WINDOW`].
    pub fn window(&self) -> usize {
        self.window
    }

    /// Norm below which an inspected row that does not yield the secret is reported.
    ///
    /// Defaults to [`DEFAULT_SUSPICIOUS_THRESHOLD`].
    pub fn suspicious_threshold(&self) -> f64 {
        self.suspicious_threshold
    }

    /// Sets the scan window, clamping to 1 on the low end.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Sets the suspicious-row threshold.
    pub fn with_suspicious_threshold(mut self, threshold: f64) -> Self {
        self.suspicious_threshold = threshold;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_SCAN_WINDOW,
            suspicious_threshold: DEFAULT_SUSPICIOUS_THRESHOLD,
        }
    }
}

// OUTCOME
// ================================================================================================

/// A short row that did not yield the secret.
#[derive(Debug, Clone, PartialEq)]
pub struct SuspiciousRow {
    /// Index of the row in the reduced basis.
    pub row: usize,
    /// Euclidean norm of the row.
    pub norm: f64,
    /// Last coordinate of the row.
    pub last_coordinate: i64,
}

/// The result of looking for the secret among the scanned rows.
///
/// Not finding the secret is an expected outcome of a lattice attack, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// A row yielded an accepted secret.
    Recovered {
        /// Index of the witnessing row in the reduced basis.
        row: usize,
        /// Euclidean norm of the witnessing row.
        norm: f64,
        /// The recovered secret, `k * n` coefficients.
        secret: Vec<i64>,
    },
    /// No scanned row yielded an accepted secret.
    NotFound {
        /// Short rows that were inspected without success, shortest first.
        suspicious: Vec<SuspiciousRow>,
    },
}

impl AttackOutcome {
    /// Returns true if a secret was recovered.
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Returns the recovered secret, if any.
    pub fn secret(&self) -> Option<&[i64]> {
        match self {
            Self::Recovered { secret, .. } => Some(secret.as_slice()),
            Self::NotFound { .. } => None,
        }
    }
}

// SCANNER
// ================================================================================================

/// One inspected row of a reduced basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRow {
    /// Index of the row in the reduced basis.
    pub index: usize,
    /// Exact squared Euclidean norm.
    pub norm_squared: i128,
    /// Last coordinate of the row.
    pub last_coordinate: i64,
    /// The middle segment, sign-corrected, if the last coordinate is `+1` or `-1`.
    pub candidate: Option<Vec<i64>>,
}

impl ScannedRow {
    /// Euclidean norm of the row.
    pub fn norm(&self) -> f64 {
        Float::sqrt(self.norm_squared as f64)
    }
}

/// Inspects the shortest rows of a reduced primal basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanner {
    params: RingParams,
    config: ScanConfig,
}

impl Scanner {
    /// Creates a scanner for bases built from instances with the given parameters.
    pub fn new(params: RingParams, config: ScanConfig) -> Self {
        Self { params, config }
    }

    /// The scanner options.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Orders the rows of `basis` by norm and inspects the shortest ones.
    ///
    /// Rows are ordered by exact squared norm with ties broken by row index; the window is
    /// extended past [ScanConfig::window] to every row whose norm equals that of the last row in
    /// the window, so a tie never hides a candidate.
    ///
    /// # Errors
    /// Returns an error if `basis` is not a square matrix of the primal lattice dimension.
    pub fn scan(&self, basis: &IntMatrix) -> Result<ScanReport, MatrixError> {
        let dim = self.params.lattice_dim();
        if basis.num_rows() != dim || basis.num_cols() != dim {
            return Err(MatrixError::DimensionMismatch {
                left_rows: basis.num_rows(),
                left_cols: basis.num_cols(),
                right_rows: dim,
                right_cols: dim,
            });
        }

        let mut order: Vec<(i128, usize)> =
            (0..dim).map(|i| (basis.row_norm_squared(i), i)).collect();
        order.sort_unstable();

        let mut end = self.config.window.min(dim);
        let cutoff = order[end - 1].0;
        while end < dim && order[end].0 == cutoff {
            end += 1;
        }

        let kn = self.params.kn();
        let rows = order[..end]
            .iter()
            .map(|&(norm_squared, index)| {
                let row = basis.row(index);
                let last_coordinate = row[dim - 1];
                let middle = &row[kn..2 * kn];
                let candidate = match last_coordinate {
                    1 => Some(middle.to_vec()),
                    -1 => Some(middle.iter().map(|&x| -x).collect()),
                    _ => None,
                };
                ScannedRow { index, norm_squared, last_coordinate, candidate }
            })
            .collect();

        Ok(ScanReport {
            params: self.params,
            suspicious_threshold: self.config.suspicious_threshold,
            rows,
        })
    }
}

// REPORT
// ================================================================================================

/// The rows inspected by a [Scanner], shortest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    params: RingParams,
    suspicious_threshold: f64,
    rows: Vec<ScannedRow>,
}

impl ScanReport {
    /// Inspected rows in ascending norm order.
    pub fn rows(&self) -> &[ScannedRow] {
        &self.rows
    }

    /// Iterates over `(row, candidate)` pairs in ascending norm order.
    pub fn candidates(&self) -> impl Iterator<Item = (&ScannedRow, &[i64])> {
        self.rows.iter().filter_map(|r| r.candidate.as_deref().map(|c| (r, c)))
    }

    /// Looks for a candidate equal to the known secret.
    ///
    /// Only a demonstration can do this; see [ScanReport::find_consistent] for the check an
    /// attacker can perform.
    pub fn find_secret(&self, secret: &[i64]) -> AttackOutcome {
        self.find_by(|candidate| candidate == secret)
    }

    /// Looks for a candidate `s` that is consistent with the public key, i.e. `s` and
    /// `t - A * s` are both short.
    pub fn find_consistent(&self, public_key: &PublicKey) -> AttackOutcome {
        let n = self.params.n();
        self.find_by(|candidate| {
            let s: Vec<RingElement> =
                candidate.chunks(n).map(|c| RingElement::new(c.to_vec())).collect();
            public_key.is_consistent(&s)
        })
    }

    /// Returns the first candidate, in ascending norm order, accepted by `accept`.
    pub fn find_by<F>(&self, mut accept: F) -> AttackOutcome
    where
        F: FnMut(&[i64]) -> bool,
    {
        let mut suspicious = Vec::new();
        for row in &self.rows {
            match &row.candidate {
                Some(candidate) if accept(candidate) => {
                    return AttackOutcome::Recovered {
                        row: row.index,
                        norm: row.norm(),
                        secret: candidate.clone(),
                    };
                },
                _ => {
                    if row.norm() < self.suspicious_threshold {
                        suspicious.push(SuspiciousRow {
                            row: row.index,
                            norm: row.norm(),
                            last_coordinate: row.last_coordinate,
                        });
                    }
                },
            }
        }
        AttackOutcome::NotFound { suspicious }
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn params() -> RingParams {
        RingParams::new(1, 1, 17, 1).unwrap()
    }

    fn matrix(rows: &[&[i64]]) -> IntMatrix {
        IntMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn tied_rows_at_the_window_edge_are_both_scanned() {
        // rows 0 and 1 both have squared norm 3; only row 1 carries the secret
        let basis = matrix(&[&[1, 1, 1], &[1, -1, 1], &[5, 0, 0]]);
        let scanner = Scanner::new(params(), ScanConfig::default().with_window(1));
        let report = scanner.scan(&basis).unwrap();

        assert_eq!(report.rows().len(), 2);
        assert_matches!(
            report.find_secret(&[-1]),
            AttackOutcome::Recovered { row: 1, ref secret, .. } if secret == &vec![-1]
        );
    }

    #[test]
    fn rows_are_ordered_by_norm_then_index() {
        let basis = matrix(&[&[4, 0, 0], &[0, 2, 0], &[0, 0, 2]]);
        let report = Scanner::new(params(), ScanConfig::default()).scan(&basis).unwrap();
        let order: Vec<usize> = report.rows().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn negative_last_coordinate_negates_the_candidate() {
        let basis = matrix(&[&[1, 1, -1], &[9, 0, 0], &[0, 9, 0]]);
        let report = Scanner::new(params(), ScanConfig::default()).scan(&basis).unwrap();
        let candidates: Vec<&[i64]> = report.candidates().map(|(_, c)| c).collect();
        assert_eq!(candidates, vec![&[-1_i64][..]]);
    }

    #[test]
    fn short_rows_without_the_secret_are_suspicious() {
        let basis = matrix(&[&[1, 0, 0], &[0, 1, 1], &[0, 0, 30]]);
        let report = Scanner::new(params(), ScanConfig::default()).scan(&basis).unwrap();

        let AttackOutcome::NotFound { suspicious } = report.find_secret(&[-1]) else {
            panic!("no row carries the secret");
        };
        // row 2 is too long to be reported
        let rows: Vec<usize> = suspicious.iter().map(|s| s.row).collect();
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(suspicious[0].last_coordinate, 0);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let scanner = Scanner::new(params(), ScanConfig::default());
        assert_matches!(
            scanner.scan(&IntMatrix::identity(5)),
            Err(MatrixError::DimensionMismatch { left_rows: 5, right_rows: 3, .. })
        );
    }

    #[test]
    fn window_is_clamped() {
        assert_eq!(ScanConfig::default().with_window(0).window(), 1);
    }
}
