//! Construction of the primal attack lattice.
//!
//! The basis has dimension `D = 2kn + 1` and the block layout
//!
//! ```text
//! [ q * I   |  0  | 0 ]   kn rows
//! [ A^T     |  I  | 0 ]   kn rows
//! [ -t      |  0  | 1 ]   1 row
//! ```
//!
//! where the `A^T` block holds the transposed negacyclic matrices of the entries of `A`. Taking
//! the secret coefficients as multipliers of the middle rows and adding the last row yields
//! `(A * s - t, s, 1) = (-e, s, 1)` modulo the `q * I` rows, a vector far shorter than any other
//! the lattice is expected to contain.

use crate::{keygen::PublicKey, matrix::IntMatrix};

/// Builds the `D x D` primal attack basis from a public key.
pub fn build_primal_basis(public_key: &PublicKey) -> IntMatrix {
    let params = public_key.params();
    let (n, k, kn) = (params.n(), params.k(), params.kn());
    let dim = params.lattice_dim();
    let mut basis = IntMatrix::zeros(dim, dim);

    // modular freedom on the error coordinates
    basis.set_block(0, 0, &IntMatrix::scalar(kn, params.q()));

    // block (r, c) of the middle rows maps the r-th secret polynomial to the c-th error column
    for r in 0..k {
        for c in 0..k {
            let block = public_key.a()[c][r].to_matrix().transpose();
            basis.set_block(kn + r * n, c * n, &block);
        }
    }
    basis.set_block(kn, kn, &IntMatrix::identity(kn));

    // target row
    let last = dim - 1;
    for (i, t) in public_key.t().iter().flat_map(|p| p.coefficients.iter()).enumerate() {
        basis.set(last, i, -t);
    }
    basis.set(last, last, 1);

    basis
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use num::BigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::{
        keygen::{KeyGenConfig, KeyPair},
        params::RingParams,
        ring::flatten,
    };

    fn small_instance(seed: u64) -> KeyPair {
        let params = RingParams::new(4, 2, 97, 1).unwrap();
        KeyPair::with_rng(params, KeyGenConfig::default(), &mut ChaCha20Rng::seed_from_u64(seed))
    }

    #[test]
    fn layout_of_blocks() {
        let pair = small_instance(3);
        let params = *pair.public.params();
        let (n, kn, dim) = (params.n(), params.kn(), params.lattice_dim());
        let basis = build_primal_basis(&pair.public);

        assert_eq!(basis.num_rows(), dim);
        assert!(basis.is_square());
        for i in 0..kn {
            assert_eq!(basis.get(i, i), params.q());
            assert_eq!(basis.get(kn + i, kn + i), 1);
            assert_eq!(basis.get(i, kn + i), 0);
        }
        // entry (row kn + r*n + i, col c*n + j) is the (j, i) entry of negacyclic(A[c][r])
        let m = pair.public.a()[0][1].to_matrix();
        for i in 0..n {
            for j in 0..n {
                assert_eq!(basis.get(kn + n + i, j), m.get(j, i));
            }
        }
        let t = flatten(pair.public.t());
        assert_eq!(&basis.row(dim - 1)[..kn], t.iter().map(|x| -x).collect::<Vec<_>>().as_slice());
        assert_eq!(basis.get(dim - 1, dim - 1), 1);
    }

    #[test]
    fn secret_embedding_is_a_lattice_vector() {
        let pair = small_instance(4);
        let params = *pair.public.params();
        let (kn, dim) = (params.kn(), params.lattice_dim());
        let basis = build_primal_basis(&pair.public);

        // combine: s on the middle rows, 1 on the last row
        let s = pair.secret.flattened_secret();
        let mut combination = vec![0_i64; dim];
        for (i, &coefficient) in s.iter().enumerate() {
            for (acc, &b) in combination.iter_mut().zip(basis.row(kn + i)) {
                *acc += coefficient * b;
            }
        }
        for (acc, &b) in combination.iter_mut().zip(basis.row(dim - 1)) {
            *acc += b;
        }

        // the error block is congruent to -e; reducing with the q*I rows gives -e exactly
        let e = flatten(pair.secret.e());
        for i in 0..kn {
            assert_eq!(params.center(combination[i]), -e[i]);
        }
        assert_eq!(&combination[kn..2 * kn], s.as_slice());
        assert_eq!(combination[dim - 1], 1);
    }

    #[test]
    fn volume_is_q_to_the_kn() {
        let pair = small_instance(5);
        let params = *pair.public.params();
        let det = build_primal_basis(&pair.public).determinant().unwrap();
        assert_eq!(det, BigInt::from(params.q()).pow(params.kn() as u32));
    }
}
