#![no_std]

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod attack;
pub mod keygen;
pub mod lattice;
pub mod lll;
pub mod matrix;
pub mod params;
pub mod ring;
pub mod scan;

// RE-EXPORTS
// ================================================================================================

pub use attack::{Attack, AttackConfig, AttackError, AttackReport, TrialSummary, run_trials};
pub use keygen::{KeyGenConfig, KeyPair, PublicKey, SecretKey};
pub use lattice::build_primal_basis;
pub use lll::{LllConfig, LllError, LllReducer, LllStats};
pub use matrix::{IntMatrix, MatrixError};
pub use params::{ParamsError, RingParams};
pub use ring::RingElement;
pub use scan::{AttackOutcome, ScanConfig, ScanReport, Scanner};

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {

    #[test]
    #[should_panic]
    fn debug_assert_is_checked() {
        // the Gram-Schmidt cache relies on `debug_assert` for its index bookkeeping; make sure
        // tests are never run with debug assertions disabled.
        debug_assert!(false);
    }

    #[test]
    #[should_panic]
    #[allow(arithmetic_overflow)]
    fn overflow_panics_for_test() {
        // basis updates use checked arithmetic in release builds, but tests must still trap on
        // any unchecked overflow that slips through.
        //
        // to enable overflow checks in release mode, ensure `RUSTFLAGS="-C overflow-checks"`
        let a = i64::MAX;
        let b = 1;
        assert_ne!(a + b, 0);
    }
}
