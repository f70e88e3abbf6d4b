//! Generation of weakened Kyber-like LWE instances.
//!
//! A key pair consists of the public key `(A, t)` with `t = A * s + e` and the secret key
//! `(s, e)`. The secret is kept only so that a demonstration can check whether the attack
//! recovered it; the attack itself consumes nothing but the public key.

use alloc::vec::Vec;
use core::fmt;

use rand::Rng;

use crate::{
    params::RingParams,
    ring::{RingElement, flatten, inner_product},
};

mod sampling;
pub use sampling::{SEED_LEN, cbd_from_seed, cbd_with_rng, expand_matrix, uniform_with_rng};

// CONFIG
// ================================================================================================

/// Options controlling how the public vector is formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyGenConfig {
    reduce_public_vector: bool,
}

impl KeyGenConfig {
    /// Whether `t = (A * s mod q) + e` is reduced into `[0, q)` after the noise is added.
    ///
    /// Defaults to `false`: the noise is added to the reduced product as is, so `t` may hold
    /// coefficients slightly outside `[0, q)`. Both choices define the same instance modulo `q`.
    pub fn reduce_public_vector(&self) -> bool {
        self.reduce_public_vector
    }

    /// Sets whether the public vector is reduced modulo `q` after adding the noise.
    pub fn with_reduced_public_vector(mut self, reduce: bool) -> Self {
        self.reduce_public_vector = reduce;
        self
    }
}

// PUBLIC KEY
// ================================================================================================

/// The public part of an LWE instance: the matrix `A` and the vector `t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    params: RingParams,
    a: Vec<Vec<RingElement>>,
    t: Vec<RingElement>,
}

impl PublicKey {
    /// Creates a public key from its components.
    ///
    /// `a` must be a `k x k` matrix and `t` a length-`k` vector of ring elements with `n`
    /// coefficients each.
    pub fn new(params: RingParams, a: Vec<Vec<RingElement>>, t: Vec<RingElement>) -> Self {
        debug_assert_eq!(a.len(), params.k());
        debug_assert!(a.iter().all(|row| row.len() == params.k()));
        debug_assert_eq!(t.len(), params.k());
        Self { params, a, t }
    }

    /// Ring parameters of this instance.
    pub fn params(&self) -> &RingParams {
        &self.params
    }

    /// The public matrix; `a()[i][j]` is the entry in block row `i`, block column `j`.
    pub fn a(&self) -> &[Vec<RingElement>] {
        &self.a
    }

    /// The public vector `t`.
    pub fn t(&self) -> &[RingElement] {
        &self.t
    }

    /// Returns `t - A * s` with every coefficient in the centered range `(-q/2, q/2]`.
    ///
    /// For the true secret this is the noise vector `e`.
    pub fn residual(&self, s: &[RingElement]) -> Vec<RingElement> {
        self.a
            .iter()
            .zip(&self.t)
            .map(|(row, t)| t.sub(&inner_product(row, s, &self.params)).center(&self.params))
            .collect()
    }

    /// Returns true if `s` is short and explains `t` up to short noise, i.e. every coefficient of
    /// `s` and of [PublicKey::residual] lies in `[-eta, eta]`.
    ///
    /// This is the check an attacker without access to the secret key uses to accept a
    /// candidate.
    pub fn is_consistent(&self, s: &[RingElement]) -> bool {
        let eta = i64::from(self.params.eta());
        s.len() == self.params.k()
            && s.iter().all(|p| p.len() == self.params.n() && p.infinity_norm() <= eta)
            && self.residual(s).iter().all(|e| e.infinity_norm() <= eta)
    }
}

// SECRET KEY
// ================================================================================================

/// The secret vector `s` and the noise vector `e` of an LWE instance.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    s: Vec<RingElement>,
    e: Vec<RingElement>,
}

impl SecretKey {
    /// Creates a secret key from the secret and noise vectors.
    pub fn new(s: Vec<RingElement>, e: Vec<RingElement>) -> Self {
        Self { s, e }
    }

    /// The secret vector.
    pub fn s(&self) -> &[RingElement] {
        &self.s
    }

    /// The noise vector.
    pub fn e(&self) -> &[RingElement] {
        &self.e
    }

    /// Coefficients of `s`, concatenated; this is what a successful attack recovers.
    pub fn flattened_secret(&self) -> Vec<i64> {
        flatten(&self.s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<elided secret for SecretKey>")
    }
}

// KEY PAIR
// ================================================================================================

/// A freshly generated LWE instance together with its secret.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

impl KeyPair {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Generates an instance from OS-provided randomness.
    #[cfg(feature = "std")]
    pub fn new(params: RingParams, config: KeyGenConfig) -> Self {
        let mut rng = rand::rng();
        Self::with_rng(params, config, &mut rng)
    }

    /// Generates an instance using the provided random number generator.
    ///
    /// `A` is sampled first, then `s`, then `e`; with a seeded RNG the instance is reproducible.
    pub fn with_rng<R: Rng + ?Sized>(
        params: RingParams,
        config: KeyGenConfig,
        rng: &mut R,
    ) -> Self {
        let k = params.k();
        let a: Vec<Vec<RingElement>> = (0..k)
            .map(|_| (0..k).map(|_| uniform_with_rng(&params, rng)).collect())
            .collect();
        let s: Vec<RingElement> = (0..k).map(|_| cbd_with_rng(&params, rng)).collect();
        let e: Vec<RingElement> = (0..k).map(|_| cbd_with_rng(&params, rng)).collect();
        Self::from_parts(params, config, a, s, e)
    }

    /// Deterministically derives an instance from a 64-byte seed, the way Kyber key generation
    /// does.
    ///
    /// The first half of the seed expands `A` through SHAKE128; the second half seeds
    /// SHAKE256 with nonces `0..k` for `s` and `k..2k` for `e`.
    pub fn from_seed(params: RingParams, config: KeyGenConfig, seed: &[u8; 2 * SEED_LEN]) -> Self {
        let mut public_seed = [0_u8; SEED_LEN];
        let mut noise_seed = [0_u8; SEED_LEN];
        public_seed.copy_from_slice(&seed[..SEED_LEN]);
        noise_seed.copy_from_slice(&seed[SEED_LEN..]);

        let k = params.k();
        let a = expand_matrix(&params, &public_seed);
        let s = (0..k).map(|i| cbd_from_seed(&params, &noise_seed, i as u8)).collect();
        let e = (0..k).map(|i| cbd_from_seed(&params, &noise_seed, (k + i) as u8)).collect();
        Self::from_parts(params, config, a, s, e)
    }

    /// Computes `t = (A * s mod q) + e` for the given matrix, secret and noise, and assembles
    /// the key pair.
    pub fn from_parts(
        params: RingParams,
        config: KeyGenConfig,
        a: Vec<Vec<RingElement>>,
        s: Vec<RingElement>,
        e: Vec<RingElement>,
    ) -> Self {
        let t = a
            .iter()
            .zip(&e)
            .map(|(row, e_i)| {
                let t_i = inner_product(row, &s, &params).add(e_i);
                if config.reduce_public_vector() { t_i.reduce(&params) } else { t_i }
            })
            .collect();

        Self {
            public: PublicKey::new(params, a, t),
            secret: SecretKey::new(s, e),
        }
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use rstest::rstest;

    use super::*;

    const PARAMS: RingParams = RingParams::TOY_KYBER;

    #[rstest]
    #[case::unreduced(false)]
    #[case::reduced(true)]
    fn public_vector_hides_secret(#[case] reduce: bool) {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let config = KeyGenConfig::default().with_reduced_public_vector(reduce);
        let pair = KeyPair::with_rng(PARAMS, config, &mut rng);

        let eta = i64::from(PARAMS.eta());
        assert!(pair.secret.s().iter().all(|p| p.infinity_norm() <= eta));
        assert!(pair.secret.e().iter().all(|p| p.infinity_norm() <= eta));

        // t - A*s recovers e exactly (in centered form)
        assert_eq!(pair.public.residual(pair.secret.s()), pair.secret.e().to_vec());
        assert!(pair.public.is_consistent(pair.secret.s()));

        let in_range = pair
            .public
            .t()
            .iter()
            .all(|t| t.coefficients.iter().all(|c| (0..PARAMS.q()).contains(c)));
        if reduce {
            assert!(in_range);
        } else {
            assert!(pair.public.t().iter().all(|t| t
                .coefficients
                .iter()
                .all(|&c| -eta <= c && c < PARAMS.q() + eta)));
        }
    }

    #[test]
    fn unreduced_and_reduced_agree_mod_q() {
        let plain =
            KeyPair::with_rng(PARAMS, KeyGenConfig::default(), &mut ChaCha20Rng::seed_from_u64(5));
        let reduced = KeyPair::with_rng(
            PARAMS,
            KeyGenConfig::default().with_reduced_public_vector(true),
            &mut ChaCha20Rng::seed_from_u64(5),
        );
        for (a, b) in plain.public.t().iter().zip(reduced.public.t()) {
            assert_eq!(a.reduce(&PARAMS), *b);
        }
    }

    #[test]
    fn wrong_secret_is_inconsistent() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let pair = KeyPair::with_rng(PARAMS, KeyGenConfig::default(), &mut rng);

        let mut wrong = pair.secret.s().to_vec();
        wrong[0].coefficients[0] += if wrong[0].coefficients[0] > 0 { -1 } else { 1 };
        assert!(!pair.public.is_consistent(&wrong));
        assert!(!pair.public.is_consistent(&wrong[..1]));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let seed = [9_u8; 2 * SEED_LEN];
        let first = KeyPair::from_seed(PARAMS, KeyGenConfig::default(), &seed);
        let second = KeyPair::from_seed(PARAMS, KeyGenConfig::default(), &seed);
        assert_eq!(first.public, second.public);
        assert_eq!(first.secret, second.secret);
        assert!(first.public.is_consistent(first.secret.s()));

        let mut other_seed = seed;
        other_seed[SEED_LEN] ^= 1;
        let third = KeyPair::from_seed(PARAMS, KeyGenConfig::default(), &other_seed);
        // only the noise seed changed, so A is shared while the secret differs
        assert_eq!(first.public.a(), third.public.a());
        assert_ne!(first.secret, third.secret);
    }

    #[test]
    fn secret_key_debug_is_elided() {
        let pair =
            KeyPair::with_rng(PARAMS, KeyGenConfig::default(), &mut ChaCha20Rng::seed_from_u64(0));
        assert_eq!(format!("{:?}", pair.secret), "<elided secret for SecretKey>");
        assert_eq!(pair.secret.flattened_secret().len(), PARAMS.kn());
    }
}
