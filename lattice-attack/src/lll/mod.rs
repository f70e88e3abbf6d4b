//! LLL (Lenstra-Lenstra-Lovász) reduction of integer lattice bases.
//!
//! The basis is kept as exact integers at every step; only the Gram-Schmidt data used to take
//! decisions is computed in floating point (see [GramSchmidt]).
//!
//! # Algorithm
//!
//! The reducer walks an index `k` from 1 to `n` and, at each index, alternates between two
//! phases:
//!
//! 1. **Size reduction**: for `j = k-1, ..., 0`, if `|mu[k][j]| > 1/2 + epsilon`, subtract
//!    `round(mu[k][j]) * b_j` from `b_k` and refresh the Gram-Schmidt data of row `k`. Sweeps are
//!    repeated until one completes without a subtraction. The small `epsilon` (see
//!    [LllConfig::size_reduction_epsilon]) absorbs rounding noise on exact halves.
//! 2. **Lovász check**: if `||b*_k||^2 >= (delta - mu[k][k-1]^2) * ||b*_{k-1}||^2`, advance to
//!    `k + 1`; otherwise swap `b_k` and `b_{k-1}`, invalidate the Gram-Schmidt data from `k - 1`
//!    and retreat to `max(k - 1, 1)`.
//!
//! The reduction terminates when `k` reaches `n`. For `delta < 1` every swap decreases the
//! potential `prod_i ||b*_i||^(2(n-i))` by at least a factor `delta`, which bounds the number of
//! swaps.
//!
//! # References
//!
//! - Lenstra, Lenstra, Lovász, "Factoring polynomials with rational coefficients" (1982).

use alloc::vec::Vec;
use core::fmt;

use num::Float;

use crate::matrix::{IntMatrix, MatrixError};

mod check;
pub use check::{ReductionViolation, check_reduced};

mod config;
pub use config::{
    DEFAULT_DELTA, DEFAULT_DRIFT_CHECK_INTERVAL, DEFAULT_DRIFT_TOLERANCE,
    DEFAULT_MAX_SIZE_REDUCTION_SWEEPS, DEFAULT_SIZE_REDUCTION_EPSILON, LllConfig,
};

mod error;
pub use error::LllError;

mod exact;
pub use exact::ExactGramSchmidt;

mod gso;
pub use gso::GramSchmidt;


/// Largest rounded coefficient that can be applied to a basis row.
const MAX_ROUNDED_COEFFICIENT: f64 = 9.0e18;

// STATE MACHINE
// ================================================================================================

/// The phase the reducer is in for the current index `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Row `k` is being size-reduced against rows `0..k`.
    SizeReducing,
    /// Row `k` is size-reduced; the Lovász condition between `k - 1` and `k` is next.
    CheckingLovasz,
    /// Every index satisfies both conditions.
    Done,
}

/// The transition taken by a single call to [LllReducer::step].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One size-reduction sweep over row `row` performed `subtractions` row subtractions.
    SizeReduced { row: usize, subtractions: usize },
    /// The Lovász condition held at `from`; the index moved to `from + 1`.
    Advanced { from: usize },
    /// The Lovász condition failed at `at`; rows `at - 1` and `at` were swapped.
    Swapped { at: usize },
    /// The reduction is complete.
    Finished,
}

/// Counters collected during a reduction.
///
/// They describe the work done and are meant for progress reporting only; they never influence
/// the reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LllStats {
    /// Number of calls to [LllReducer::step] that changed the state.
    pub iterations: u64,
    /// Number of row subtractions performed by size reduction.
    pub size_reductions: u64,
    /// Number of row swaps.
    pub swaps: u64,
    /// Number of single-row Gram-Schmidt recomputations.
    pub gso_row_updates: u64,
    /// Number of Gram-Schmidt consistency checks performed.
    pub drift_checks: u64,
}

// REDUCER
// ================================================================================================

/// In-place LLL reduction of a square integer basis.
///
/// The reducer owns the basis and its Gram-Schmidt cache for the duration of the reduction.
/// [LllReducer::reduce] runs to completion; [LllReducer::step] exposes single transitions.
#[derive(Debug, Clone)]
pub struct LllReducer {
    basis: IntMatrix,
    gso: GramSchmidt,
    config: LllConfig,
    k: usize,
    phase: Phase,
    sweeps: usize,
    stats: LllStats,
}

impl LllReducer {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Prepares the reduction of `basis`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the basis is not square or has fewer than two rows;
    /// - the rows of the basis are linearly dependent (for example, one of them is zero).
    pub fn new(basis: IntMatrix, config: LllConfig) -> Result<Self, LllError> {
        if !basis.is_square() {
            return Err(LllError::NotSquare { rows: basis.num_rows(), cols: basis.num_cols() });
        }
        let n = basis.num_rows();
        if n < 2 {
            return Err(LllError::TooSmall(n));
        }

        let gso = GramSchmidt::compute(&basis)?;
        let mut reducer = Self {
            basis,
            gso,
            config,
            k: 1,
            phase: Phase::SizeReducing,
            sweeps: 0,
            stats: LllStats::default(),
        };
        reducer.sync_stats();
        Ok(reducer)
    }

    /// Prepares the reduction of a basis given as floating-point rows holding integer values.
    ///
    /// # Errors
    /// Returns an error if an entry is not an integer, in addition to the errors of
    /// [LllReducer::new].
    pub fn from_f64_rows(rows: &[Vec<f64>], config: LllConfig) -> Result<Self, LllError> {
        Self::new(IntMatrix::try_from_f64_rows(rows)?, config)
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// The current basis.
    pub fn basis(&self) -> &IntMatrix {
        &self.basis
    }

    /// Consumes the reducer and returns the basis.
    pub fn into_basis(self) -> IntMatrix {
        self.basis
    }

    /// The Gram-Schmidt cache; only its first [GramSchmidt::valid_rows] rows are meaningful.
    pub fn gso(&self) -> &GramSchmidt {
        &self.gso
    }

    /// The configuration of this reduction.
    pub fn config(&self) -> &LllConfig {
        &self.config
    }

    /// The current index `k`.
    pub fn index(&self) -> usize {
        self.k
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Work counters so far.
    pub fn stats(&self) -> &LllStats {
        &self.stats
    }

    /// Dimension of the basis.
    pub fn dimension(&self) -> usize {
        self.basis.num_rows()
    }

    // REDUCTION
    // --------------------------------------------------------------------------------------------

    /// Runs the reduction to completion.
    ///
    /// On success the basis is `delta`-LLL-reduced and the cached Gram-Schmidt data has been
    /// checked against an exact recomputation from the integer basis.
    ///
    /// # Errors
    /// Returns the first fatal error encountered; the basis is left in its intermediate state.
    pub fn reduce(&mut self) -> Result<&LllStats, LllError> {
        while self.step()? != Step::Finished {}
        Ok(&self.stats)
    }

    /// Performs a single transition of the state machine.
    ///
    /// # Errors
    /// Returns an error if a row update overflows, a row becomes degenerate, size reduction
    /// stalls, the cached Gram-Schmidt data drifts, or the iteration budget is exhausted.
    pub fn step(&mut self) -> Result<Step, LllError> {
        if self.phase == Phase::Done {
            return Ok(Step::Finished);
        }

        if let Some(budget) = self.config.max_iterations() {
            if self.stats.iterations >= budget {
                return Err(LllError::IterationBudgetExhausted(budget));
            }
        }
        self.stats.iterations += 1;

        // rows 0..=k are read in both phases
        self.gso.refresh(&self.basis, self.k + 1)?;

        let step = match self.phase {
            Phase::SizeReducing => self.size_reduce_sweep()?,
            Phase::CheckingLovasz => self.check_lovasz(),
            Phase::Done => Step::Finished,
        };

        if self.phase == Phase::Done {
            self.check_drift()?;
        } else if let Some(interval) = self.config.drift_check_interval() {
            if self.stats.iterations % interval == 0 {
                self.check_drift()?;
            }
        }

        self.sync_stats();
        Ok(step)
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Makes one pass `j = k-1, ..., 0` over row `k`.
    fn size_reduce_sweep(&mut self) -> Result<Step, LllError> {
        let k = self.k;
        let bound = 0.5 + self.config.size_reduction_epsilon();
        let mut subtractions = 0;

        for j in (0..k).rev() {
            let mu = self.gso.mu(k, j);
            if Float::abs(mu) <= bound {
                continue;
            }

            let rounded = Float::round(mu);
            if !(Float::abs(rounded) < MAX_ROUNDED_COEFFICIENT) {
                return Err(LllError::CoefficientOverflow { row: k });
            }
            self.basis.sub_row_multiple(k, j, rounded as i64).map_err(|err| match err {
                MatrixError::Overflow { row } => LllError::CoefficientOverflow { row },
                other => LllError::Matrix(other),
            })?;

            // b_k changed: its own Gram-Schmidt row must be recomputed before the next mu is read
            self.gso.invalidate_from(k);
            self.gso.refresh(&self.basis, k + 1)?;
            subtractions += 1;
        }

        self.stats.size_reductions += subtractions as u64;
        if subtractions == 0 {
            self.sweeps = 0;
            self.phase = Phase::CheckingLovasz;
        } else {
            self.sweeps += 1;
            if self.sweeps >= self.config.max_size_reduction_sweeps() {
                return Err(LllError::SizeReductionStalled { row: k, sweeps: self.sweeps });
            }
        }

        Ok(Step::SizeReduced { row: k, subtractions })
    }

    /// Tests the Lovász condition at `k` and advances or swaps.
    fn check_lovasz(&mut self) -> Step {
        let k = self.k;
        let mu = self.gso.mu(k, k - 1);
        let lhs = self.gso.norm_squared(k);
        let rhs = (self.config.delta() - mu * mu) * self.gso.norm_squared(k - 1);

        if lhs >= rhs {
            self.k += 1;
            self.phase =
                if self.k == self.dimension() { Phase::Done } else { Phase::SizeReducing };
            Step::Advanced { from: k }
        } else {
            self.basis.swap_rows(k, k - 1);
            self.gso.invalidate_from(k - 1);
            self.stats.swaps += 1;
            self.k = (k - 1).max(1);
            self.phase = Phase::SizeReducing;
            Step::Swapped { at: k }
        }
    }

    /// Compares the cached Gram-Schmidt prefix against the exact values of the current basis.
    fn check_drift(&mut self) -> Result<(), LllError> {
        self.stats.drift_checks += 1;
        let exact = ExactGramSchmidt::compute(&self.basis)?;
        self.gso.check_consistency(&exact, self.config.drift_tolerance())
    }

    fn sync_stats(&mut self) {
        self.stats.gso_row_updates = self.gso.row_updates();
    }
}

impl fmt::Display for LllReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LLL reducer")?;
        writeln!(f, "  dimension: {}", self.dimension())?;
        writeln!(f, "  delta: {}", self.config.delta())?;
        writeln!(f, "  index: {} ({:?})", self.k, self.phase)?;
        writeln!(f, "  iterations: {}", self.stats.iterations)?;
        writeln!(f, "  size reductions: {}", self.stats.size_reductions)?;
        writeln!(f, "  swaps: {}", self.stats.swaps)?;
        write!(f, "  gso row updates: {}", self.stats.gso_row_updates)
    }
}

// CONVENIENCE
// ================================================================================================

/// Reduces `basis` with the given configuration and returns the reduced basis with the
/// collected statistics.
///
/// # Errors
/// Returns the errors of [LllReducer::new] and [LllReducer::reduce].
pub fn reduce(basis: IntMatrix, config: LllConfig) -> Result<(IntMatrix, LllStats), LllError> {
    let mut reducer = LllReducer::new(basis, config)?;
    let stats = *reducer.reduce()?;
    Ok((reducer.into_basis(), stats))
}
