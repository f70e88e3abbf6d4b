//! This module contains the configuration structure for LLL reduction.

use crate::params::{
    ParamsError, validate_delta, validate_drift_tolerance, validate_size_reduction_epsilon,
};

// CONSTANTS
// ================================================================================================

/// The default Lovász parameter.
pub const DEFAULT_DELTA: f64 = 0.99;

/// The default number of loop steps between two Gram-Schmidt consistency checks.
pub const DEFAULT_DRIFT_CHECK_INTERVAL: u64 = 1 << 14;

/// The default relative tolerance of the Gram-Schmidt consistency check.
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 1e-6;

/// The default number of size-reduction sweeps over one row before giving up.
pub const DEFAULT_MAX_SIZE_REDUCTION_SWEEPS: usize = 64;

/// The default slack above 1/2 tolerated on `|mu|` before a row is size-reduced.
///
/// Exact coefficients of `+-1/2` are common in q-ary lattices and come out of `f64` as
/// `0.5000000000000001`; without the slack size reduction flips such a row back and forth.
pub const DEFAULT_SIZE_REDUCTION_EPSILON: f64 = 1e-9;

// CONFIG
// ================================================================================================

/// The configuration of an LLL reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LllConfig {
    delta: f64,
    drift_check_interval: Option<u64>,
    drift_tolerance: f64,
    max_size_reduction_sweeps: usize,
    size_reduction_epsilon: f64,
    max_iterations: Option<u64>,
}

/// This block contains the accessors for the configuration options.
impl LllConfig {
    /// The Lovász parameter, always in `(0.25, 1)`.
    ///
    /// Defaults to [`DEFAULT_DELTA`].
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of loop steps between two comparisons of the cached Gram-Schmidt data against a
    /// fresh recomputation, or `None` if only the final check is performed.
    ///
    /// Defaults to [`DEFAULT_DRIFT_CHECK_INTERVAL`].
    pub fn drift_check_interval(&self) -> Option<u64> {
        self.drift_check_interval
    }

    /// Relative tolerance used by the consistency check.
    ///
    /// Defaults to [`DEFAULT_DRIFT_TOLERANCE`].
    pub fn drift_tolerance(&self) -> f64 {
        self.drift_tolerance
    }

    /// Maximum number of full sweeps size reduction may take on a single row.
    ///
    /// Defaults to [`DEFAULT_MAX_SIZE_REDUCTION_SWEEPS`].
    pub fn max_size_reduction_sweeps(&self) -> usize {
        self.max_size_reduction_sweeps
    }

    /// Row `k` is size-reduced against row `j` only if `|mu[k][j]| > 1/2 + epsilon`.
    ///
    /// Defaults to [`DEFAULT_SIZE_REDUCTION_EPSILON`].
    pub fn size_reduction_epsilon(&self) -> f64 {
        self.size_reduction_epsilon
    }

    /// Maximum number of loop steps, or `None` for no limit.
    ///
    /// Defaults to `None`.
    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }
}

// BUILDERS
// ================================================================================================

/// This impl block contains the builder functions for the configuration options.
impl LllConfig {
    /// Sets the Lovász parameter.
    ///
    /// # Errors
    /// Returns an error if `delta` is not in the open interval `(0.25, 1)`.
    pub fn with_delta(mut self, delta: f64) -> Result<Self, ParamsError> {
        self.delta = validate_delta(delta)?;
        Ok(self)
    }

    /// Sets the interval between consistency checks; `None` or `Some(0)` disables them.
    pub fn with_drift_check_interval(mut self, interval: Option<u64>) -> Self {
        self.drift_check_interval = interval.filter(|&i| i > 0);
        self
    }

    /// Sets the relative tolerance of the consistency check.
    ///
    /// # Errors
    /// Returns an error if `tolerance` is not positive and finite.
    pub fn with_drift_tolerance(mut self, tolerance: f64) -> Result<Self, ParamsError> {
        self.drift_tolerance = validate_drift_tolerance(tolerance)?;
        Ok(self)
    }

    /// Sets the number of size-reduction sweeps allowed per row.
    ///
    /// # Errors
    /// Returns an error if `sweeps` is zero.
    pub fn with_max_size_reduction_sweeps(mut self, sweeps: usize) -> Result<Self, ParamsError> {
        if sweeps == 0 {
            return Err(ParamsError::ZeroSweeps);
        }
        self.max_size_reduction_sweeps = sweeps;
        Ok(self)
    }

    /// Sets the slack above 1/2 tolerated on `|mu|` by size reduction.
    ///
    /// # Errors
    /// Returns an error if `epsilon` is not in `[0, 1/2)`.
    pub fn with_size_reduction_epsilon(mut self, epsilon: f64) -> Result<Self, ParamsError> {
        self.size_reduction_epsilon = validate_size_reduction_epsilon(epsilon)?;
        Ok(self)
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

// TRAIT IMPLS
// ================================================================================================

/// Please see individual methods on [`LllConfig`] for the default value of each option.
impl Default for LllConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            drift_check_interval: Some(DEFAULT_DRIFT_CHECK_INTERVAL),
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
            max_size_reduction_sweeps: DEFAULT_MAX_SIZE_REDUCTION_SWEEPS,
            size_reduction_epsilon: DEFAULT_SIZE_REDUCTION_EPSILON,
            max_iterations: None,
        }
    }
}
