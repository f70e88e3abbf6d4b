//! Arithmetic in the ring `Z_q[x] / (x^n + 1)`.
//!
//! Multiplication is exact schoolbook convolution followed by negacyclic folding: the
//! coefficient of `x^(i + n)` is subtracted from the coefficient of `x^i`, since `x^n = -1`.

use alloc::vec::Vec;

use crate::{matrix::IntMatrix, params::RingParams};

mod negacyclic;


// RING ELEMENT
// ================================================================================================

/// A polynomial with `n` integer coefficients, ordered from lowest to highest degree.
///
/// Coefficients are not implicitly reduced: secret and noise polynomials keep their small signed
/// values, while public values are kept in `[0, q)` by the operations that produce them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RingElement {
    /// Coefficients of the polynomial, ordered from lowest to highest degree.
    pub coefficients: Vec<i64>,
}

impl RingElement {
    /// Creates a ring element from the provided coefficients.
    pub fn new(coefficients: Vec<i64>) -> Self {
        Self { coefficients }
    }

    /// Returns the zero polynomial with `n` coefficients.
    pub fn zero(n: usize) -> Self {
        Self::new(vec![0; n])
    }

    /// Returns the constant polynomial `1` with `n` coefficients.
    pub fn one(n: usize) -> Self {
        let mut coefficients = vec![0; n];
        if let Some(c) = coefficients.first_mut() {
            *c = 1;
        }
        Self::new(coefficients)
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns true if the element has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    // RING OPERATIONS
    // --------------------------------------------------------------------------------------------

    /// Multiplies two ring elements modulo `x^n + 1` and `q`.
    ///
    /// Inputs may carry arbitrary signed coefficients; they are reduced into `[0, q)` before the
    /// convolution so the accumulation stays exact. Every output coefficient lies in `[0, q)`.
    pub fn multiply(&self, other: &Self, params: &RingParams) -> Self {
        let n = params.n();
        debug_assert_eq!(self.len(), n);
        debug_assert_eq!(other.len(), n);

        let a: Vec<i128> = self.coefficients.iter().map(|&c| params.reduce(c).into()).collect();
        let b: Vec<i128> = other.coefficients.iter().map(|&c| params.reduce(c).into()).collect();

        let mut product = vec![0_i128; 2 * n];
        for (i, &ai) in a.iter().enumerate() {
            if ai == 0 {
                continue;
            }
            for (j, &bj) in b.iter().enumerate() {
                product[i + j] += ai * bj;
            }
        }

        let q = i128::from(params.q());
        let coefficients = (0..n)
            .map(|i| {
                let folded = (product[i] - product[i + n]).rem_euclid(q);
                // folded < q < 2^31, so the narrowing is lossless
                folded as i64
            })
            .collect();

        Self::new(coefficients)
    }

    /// Adds two ring elements coefficient-wise without any modular reduction.
    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self::new(self.coefficients.iter().zip(&other.coefficients).map(|(a, b)| a + b).collect())
    }

    /// Subtracts `other` from `self` coefficient-wise without any modular reduction.
    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self::new(self.coefficients.iter().zip(&other.coefficients).map(|(a, b)| a - b).collect())
    }

    /// Returns a copy with every coefficient reduced into `[0, q)`.
    pub fn reduce(&self, params: &RingParams) -> Self {
        Self::new(self.coefficients.iter().map(|&c| params.reduce(c)).collect())
    }

    /// Returns a copy with every coefficient reduced into `(-q/2, q/2]`.
    pub fn center(&self, params: &RingParams) -> Self {
        Self::new(self.coefficients.iter().map(|&c| params.center(c)).collect())
    }

    /// Returns the largest absolute coefficient.
    pub fn infinity_norm(&self) -> i64 {
        self.coefficients.iter().map(|c| c.abs()).max().unwrap_or(0)
    }

    /// Returns the matrix `M` with `M * x = self * x` in the ring, for every coefficient vector
    /// `x` (modulo `q`).
    ///
    /// Column `i` holds the coefficients of `x^i * self`: the polynomial rotated down by `i`
    /// positions, with the `i` entries that wrapped around negated.
    pub fn to_matrix(&self) -> IntMatrix {
        negacyclic::multiplication_matrix(&self.coefficients)
    }
}

// MODULE OPERATIONS
// ================================================================================================

/// Computes the inner product `sum_j a[j] * b[j]` of two vectors of ring elements, with every
/// coefficient of the result in `[0, q)`.
pub fn inner_product(a: &[RingElement], b: &[RingElement], params: &RingParams) -> RingElement {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| x.multiply(y, params))
        .fold(RingElement::zero(params.n()), |acc, p| acc.add(&p).reduce(params))
}

/// Concatenates the coefficients of a vector of ring elements.
pub fn flatten(elements: &[RingElement]) -> Vec<i64> {
    elements.iter().flat_map(|e| e.coefficients.iter().copied()).collect()
}
