//! Shared inputs for the benchmarks.

#![allow(dead_code)]

use lattice_attack::{KeyGenConfig, KeyPair, RingParams};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Module ranks benchmarked with ring degree 16; rank 2 is the toy Kyber instance.
pub const RANKS: &[usize] = &[1, 2];

/// Ring degrees benchmarked for plain multiplication.
pub const DEGREES: &[usize] = &[16, 64, 256];

/// Parameters of rank `k` over the toy Kyber ring.
pub fn params(k: usize) -> RingParams {
    RingParams::new(16, k, 3329, 2).expect("toy parameters are valid")
}

/// A deterministic instance for the given parameters.
pub fn instance(params: RingParams, seed: u64) -> KeyPair {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    KeyPair::with_rng(params, KeyGenConfig::default(), &mut rng)
}
