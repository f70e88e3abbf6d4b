//! Floating-point Gram-Schmidt cache attached to an integer basis.
//!
//! For a basis `b_0, ..., b_{n-1}` the cache stores
//! - `b*_i = b_i - sum_{j<i} mu[i][j] * b*_j`, the orthogonalized rows,
//! - `mu[i][j] = <b_i, b*_j> / ||b*_j||^2` for `j < i`,
//! - `||b*_i||^2`.
//!
//! Row `i` of the cache depends only on basis rows `0..=i`. The cache therefore tracks a valid
//! prefix: mutating basis row `k` invalidates cached rows `k..n`, and [GramSchmidt::refresh]
//! recomputes exactly the invalidated rows that are needed next.

use alloc::vec::Vec;

use num::Float;

use super::{ExactGramSchmidt, LllError};
use crate::matrix::IntMatrix;

/// Rows whose orthogonal part is this small relative to their own length are treated as
/// linearly dependent on the previous rows.
const DEGENERACY_EPSILON: f64 = 1e-12;

// GRAM-SCHMIDT CACHE
// ================================================================================================

/// Gram-Schmidt orthogonalization of an integer basis, computed in `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct GramSchmidt {
    ortho: Vec<Vec<f64>>,
    mu: Vec<Vec<f64>>,
    norms_sq: Vec<f64>,
    /// Rows `0..valid` are consistent with the basis.
    valid: usize,
    /// Number of single-row recomputations performed so far.
    row_updates: u64,
}

impl GramSchmidt {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Returns an empty cache for a basis with `rows` rows of `cols` entries; nothing is valid.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            ortho: vec![vec![0.0; cols]; rows],
            mu: vec![vec![0.0; rows]; rows],
            norms_sq: vec![0.0; rows],
            valid: 0,
            row_updates: 0,
        }
    }

    /// Computes the full orthogonalization of `basis` from scratch.
    ///
    /// # Errors
    /// Returns an error if the rows of `basis` are linearly dependent or the computation produces
    /// non-finite values.
    pub fn compute(basis: &IntMatrix) -> Result<Self, LllError> {
        let mut gso = Self::empty(basis.num_rows(), basis.num_cols());
        gso.refresh(basis, basis.num_rows())?;
        Ok(gso)
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Number of rows covered by the cache.
    pub fn num_rows(&self) -> usize {
        self.norms_sq.len()
    }

    /// Number of leading rows that are currently consistent with the basis.
    pub fn valid_rows(&self) -> usize {
        self.valid
    }

    /// Number of single-row recomputations performed since the cache was created.
    pub fn row_updates(&self) -> u64 {
        self.row_updates
    }

    /// Returns `mu[i][j]` for `j < i`.
    pub fn mu(&self, i: usize, j: usize) -> f64 {
        debug_assert!(j < i && i < self.valid, "mu[{i}][{j}] read outside the valid prefix");
        self.mu[i][j]
    }

    /// Returns `||b*_i||^2`.
    pub fn norm_squared(&self, i: usize) -> f64 {
        debug_assert!(i < self.valid, "norm of row {i} read outside the valid prefix");
        self.norms_sq[i]
    }

    /// Returns the orthogonalized row `b*_i`.
    pub fn ortho(&self, i: usize) -> &[f64] {
        debug_assert!(i < self.valid, "row {i} read outside the valid prefix");
        &self.ortho[i]
    }

    // CACHE MAINTENANCE
    // --------------------------------------------------------------------------------------------

    /// Marks rows `row..n` as stale after basis row `row` changed.
    pub fn invalidate_from(&mut self, row: usize) {
        self.valid = self.valid.min(row);
    }

    /// Recomputes stale rows so that at least rows `0..upto` are valid.
    ///
    /// # Errors
    /// Returns an error if a recomputed row turns out to be degenerate or non-finite.
    pub fn refresh(&mut self, basis: &IntMatrix, upto: usize) -> Result<(), LllError> {
        let upto = upto.min(self.num_rows());
        while self.valid < upto {
            self.recompute_row(basis, self.valid)?;
            self.valid += 1;
        }
        Ok(())
    }

    /// Invalidates rows `k..n` and recomputes all of them.
    pub fn recompute_from(&mut self, basis: &IntMatrix, k: usize) -> Result<(), LllError> {
        self.invalidate_from(k);
        self.refresh(basis, self.num_rows())
    }

    /// Compares every valid cached row against `exact`, the exact Gram-Schmidt data of the
    /// basis the cache is attached to.
    ///
    /// # Errors
    /// Returns [LllError::NumericDrift] for the first value whose relative deviation exceeds
    /// `tolerance`.
    pub fn check_consistency(
        &self,
        exact: &ExactGramSchmidt,
        tolerance: f64,
    ) -> Result<(), LllError> {
        let rows = self.valid.min(exact.num_rows());
        for i in 0..rows {
            let (cached, recomputed) = (self.norms_sq[i], exact.norm_squared(i));
            if drifted(cached, recomputed, tolerance) {
                return Err(LllError::NumericDrift { row: i, column: i, cached, recomputed });
            }
            for j in 0..i {
                let (cached, recomputed) = (self.mu[i][j], exact.mu(i, j));
                if drifted(cached, recomputed, tolerance) {
                    return Err(LllError::NumericDrift { row: i, column: j, cached, recomputed });
                }
            }
        }
        Ok(())
    }

    // QUALITY METRICS
    // --------------------------------------------------------------------------------------------

    /// Returns `sum_i (n - i) * ln ||b*_i||^2`, the logarithm of the LLL potential.
    ///
    /// Size reduction leaves it unchanged and every Lovász swap decreases it by at least
    /// `-ln(delta)`.
    pub fn log_potential(&self) -> f64 {
        let n = self.num_rows();
        (0..self.valid).map(|i| (n - i) as f64 * Float::ln(self.norms_sq[i])).sum()
    }

    /// Returns the logarithm of the lattice volume, `sum_i ln ||b*_i||`.
    pub fn log_volume(&self) -> f64 {
        (0..self.valid).map(|i| 0.5 * Float::ln(self.norms_sq[i])).sum()
    }

    /// Returns the root Hermite factor numerator `||b_0|| / vol(L)^(1/n)` given the first row.
    pub fn hermite_factor(&self, first_row: &[i64]) -> f64 {
        let b0: f64 = first_row.iter().map(|&x| (x as f64) * (x as f64)).sum();
        let n = self.valid.max(1) as f64;
        Float::exp(0.5 * Float::ln(b0) - self.log_volume() / n)
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    fn recompute_row(&mut self, basis: &IntMatrix, i: usize) -> Result<(), LllError> {
        let b: Vec<f64> = basis.row(i).iter().map(|&x| x as f64).collect();
        let mut v = b.clone();

        for j in 0..i {
            let mu = dot(&b, &self.ortho[j]) / self.norms_sq[j];
            self.mu[i][j] = mu;
            for (vk, ok) in v.iter_mut().zip(&self.ortho[j]) {
                *vk -= mu * ok;
            }
        }

        let norm_sq = dot(&v, &v);
        if !norm_sq.is_finite() || self.mu[i][..i].iter().any(|m| !m.is_finite()) {
            return Err(LllError::NonFinite { row: i });
        }
        if norm_sq <= DEGENERACY_EPSILON * dot(&b, &b) {
            return Err(LllError::DegenerateBasis { row: i });
        }

        self.norms_sq[i] = norm_sq;
        self.ortho[i] = v;
        self.row_updates += 1;
        Ok(())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn drifted(cached: f64, recomputed: f64, tolerance: f64) -> bool {
    let scale = Float::abs(recomputed).max(1.0);
    !(Float::abs(cached - recomputed) <= tolerance * scale)
}
