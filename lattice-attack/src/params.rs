//! Ring parameters shared by every stage of the attack.

use thiserror::Error;

// CONSTANTS
// ================================================================================================

/// Largest modulus accepted by [RingParams::new]. Keeps every product of two reduced
/// coefficients comfortably inside `i64`.
pub const MAX_MODULUS: i64 = 1 << 31;

// ERRORS
// ================================================================================================

/// Errors raised while validating ring or reduction parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("polynomial degree must be at least 1")]
    ZeroDegree,
    #[error("module rank must be at least 1")]
    ZeroRank,
    #[error("modulus {0} is outside of the supported range [2, 2^31)")]
    InvalidModulus(i64),
    #[error("noise bound {eta} is too large for modulus {q}")]
    NoiseTooLarge { eta: u32, q: i64 },
    #[error("reduction parameter delta {0} is not in the open interval (0.25, 1)")]
    InvalidDelta(f64),
    #[error("drift tolerance {0} must be positive and finite")]
    InvalidDriftTolerance(f64),
    #[error("size-reduction epsilon {0} is not in the interval [0, 0.5)")]
    InvalidSizeReductionEpsilon(f64),
    #[error("at least one size-reduction sweep per row is required")]
    ZeroSweeps,
}

// RING PARAMETERS
// ================================================================================================

/// Parameters of the module ring `(Z_q[x] / (x^n + 1))^k` and of the noise distribution.
///
/// The values are fixed for the duration of one run and are passed explicitly to every
/// component that needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingParams {
    n: usize,
    k: usize,
    q: i64,
    eta: u32,
}

impl RingParams {
    /// The deliberately weakened Kyber-like parameter set: N = 16, K = 2, Q = 3329, ETA = 2.
    pub const TOY_KYBER: Self = Self { n: 16, k: 2, q: 3329, eta: 2 };

    /// Returns validated ring parameters.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `n` or `k` is zero.
    /// - `q` is smaller than 2 or not smaller than [MAX_MODULUS].
    /// - `2 * eta` is not smaller than `q`, i.e. noise coefficients would wrap around.
    pub fn new(n: usize, k: usize, q: i64, eta: u32) -> Result<Self, ParamsError> {
        if n == 0 {
            return Err(ParamsError::ZeroDegree);
        }
        if k == 0 {
            return Err(ParamsError::ZeroRank);
        }
        if !(2..MAX_MODULUS).contains(&q) {
            return Err(ParamsError::InvalidModulus(q));
        }
        if 2 * i64::from(eta) >= q {
            return Err(ParamsError::NoiseTooLarge { eta, q });
        }
        Ok(Self { n, k, q, eta })
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Degree of the quotient polynomial `x^n + 1`.
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Module rank, i.e. the number of ring elements in `s`, `e` and `t`.
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Prime modulus.
    pub const fn q(&self) -> i64 {
        self.q
    }

    /// Bound on the absolute value of secret and noise coefficients.
    pub const fn eta(&self) -> u32 {
        self.eta
    }

    /// Number of integer coordinates of a length-`k` vector of ring elements.
    pub const fn kn(&self) -> usize {
        self.k * self.n
    }

    /// Dimension of the primal attack lattice, `2 * k * n + 1`.
    pub const fn lattice_dim(&self) -> usize {
        2 * self.kn() + 1
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Reduces `value` into `[0, q)`.
    pub fn reduce(&self, value: i64) -> i64 {
        value.rem_euclid(self.q)
    }

    /// Reduces `value` into the centered range `(-q/2, q/2]`.
    pub fn center(&self, value: i64) -> i64 {
        let r = self.reduce(value);
        if r > self.q / 2 { r - self.q } else { r }
    }
}

impl Default for RingParams {
    fn default() -> Self {
        Self::TOY_KYBER
    }
}

/// Checks that `delta` lies strictly between 1/4 and 1.
pub fn validate_delta(delta: f64) -> Result<f64, ParamsError> {
    if delta > 0.25 && delta < 1.0 {
        Ok(delta)
    } else {
        Err(ParamsError::InvalidDelta(delta))
    }
}

/// Checks that a drift tolerance is positive and finite.
pub fn validate_drift_tolerance(tolerance: f64) -> Result<f64, ParamsError> {
    if tolerance > 0.0 && tolerance.is_finite() {
        Ok(tolerance)
    } else {
        Err(ParamsError::InvalidDriftTolerance(tolerance))
    }
}

/// Checks that a size-reduction epsilon lies in `[0, 1/2)`.
pub fn validate_size_reduction_epsilon(epsilon: f64) -> Result<f64, ParamsError> {
    if (0.0..0.5).contains(&epsilon) {
        Ok(epsilon)
    } else {
        Err(ParamsError::InvalidSizeReductionEpsilon(epsilon))
    }
}

// TESTS
// ================================================================================================
