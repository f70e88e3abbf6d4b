//! Samplers for uniform and centered-binomial ring elements.
//!
//! Two sources of randomness are supported: any [rand::Rng], and the SHAKE-based expansion used
//! by Kyber key generation, where a 32-byte seed deterministically determines the whole instance.

use alloc::vec::Vec;

use rand::Rng;
use sha3::{
    Shake128, Shake256,
    digest::{ExtendableOutput, Update, XofReader},
};

use crate::{params::RingParams, ring::RingElement};

/// Length of each of the two seeds (public matrix seed, noise seed).
pub const SEED_LEN: usize = 32;

// RNG SAMPLING
// ================================================================================================

/// Samples a ring element with coefficients uniform in `[0, q)`.
pub fn uniform_with_rng<R: Rng + ?Sized>(params: &RingParams, rng: &mut R) -> RingElement {
    RingElement::new((0..params.n()).map(|_| rng.random_range(0..params.q())).collect())
}

/// Samples a ring element from the centered binomial distribution with parameter `eta`.
///
/// Every coefficient is a sum of `eta` independent steps, each the difference of two fair bits,
/// so it lies in `[-eta, eta]` and has zero mean.
pub fn cbd_with_rng<R: Rng + ?Sized>(params: &RingParams, rng: &mut R) -> RingElement {
    let coefficients = (0..params.n())
        .map(|_| {
            (0..params.eta())
                .map(|_| i64::from(rng.random::<bool>()) - i64::from(rng.random::<bool>()))
                .sum()
        })
        .collect();
    RingElement::new(coefficients)
}

// XOF SAMPLING
// ================================================================================================

/// Expands the public matrix `A` from `seed` by rejection sampling on SHAKE128 output.
///
/// Entry `A[i][j]` is sampled from `SHAKE128(seed || j || i)`; candidate values are read
/// little-endian, `ceil(log2 q)` bits at a time, and kept when smaller than `q`. For `q = 3329`
/// this is exactly Kyber's 12-bit packing.
pub fn expand_matrix(params: &RingParams, seed: &[u8; SEED_LEN]) -> Vec<Vec<RingElement>> {
    let k = params.k();
    let bits = value_bits(params.q());
    (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    let mut hasher = Shake128::default();
                    hasher.update(seed);
                    hasher.update(&[j as u8, i as u8]);
                    let mut stream = BitStream::new(hasher.finalize_xof());

                    let mut coefficients = Vec::with_capacity(params.n());
                    while coefficients.len() < params.n() {
                        let candidate = stream.next_bits(bits) as i64;
                        if candidate < params.q() {
                            coefficients.push(candidate);
                        }
                    }
                    RingElement::new(coefficients)
                })
                .collect()
        })
        .collect()
}

/// Samples a centered binomial ring element from `SHAKE256(seed || nonce)`.
///
/// Each coefficient consumes `2 * eta` bits: the sum of the first `eta` bits minus the sum of the
/// next `eta` bits.
pub fn cbd_from_seed(params: &RingParams, seed: &[u8; SEED_LEN], nonce: u8) -> RingElement {
    let mut hasher = Shake256::default();
    hasher.update(seed);
    hasher.update(&[nonce]);
    let mut stream = BitStream::new(hasher.finalize_xof());

    let coefficients = (0..params.n())
        .map(|_| {
            let a: i64 = (0..params.eta()).map(|_| stream.next_bits(1) as i64).sum();
            let b: i64 = (0..params.eta()).map(|_| stream.next_bits(1) as i64).sum();
            a - b
        })
        .collect();
    RingElement::new(coefficients)
}

// HELPERS
// ================================================================================================

/// Number of bits needed to represent every value in `[0, q)`.
fn value_bits(q: i64) -> u32 {
    64 - ((q - 1) as u64).leading_zeros().min(63)
}

/// Least-significant-bit-first reader over an extendable-output function.
struct BitStream<R: XofReader> {
    reader: R,
    current: u8,
    available: u32,
}

impl<R: XofReader> BitStream<R> {
    fn new(reader: R) -> Self {
        Self { reader, current: 0, available: 0 }
    }

    fn next_bits(&mut self, count: u32) -> u64 {
        debug_assert!(count <= 64);
        let mut value = 0_u64;
        for i in 0..count {
            if self.available == 0 {
                let mut byte = [0_u8; 1];
                self.reader.read(&mut byte);
                self.current = byte[0];
                self.available = 8;
            }
            value |= u64::from(self.current & 1) << i;
            self.current >>= 1;
            self.available -= 1;
        }
        value
    }
}

// TESTS
// ================================================================================================
