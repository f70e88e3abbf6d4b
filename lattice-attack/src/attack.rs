//! The end-to-end primal attack: instance generation, basis construction, reduction and
//! candidate scanning.

use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "concurrent")]
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    keygen::{KeyGenConfig, KeyPair, PublicKey},
    lattice::build_primal_basis,
    lll::{GramSchmidt, LllConfig, LllError, LllReducer, LllStats},
    matrix::{IntMatrix, MatrixError},
    params::{ParamsError, RingParams},
    scan::{AttackOutcome, ScanConfig, ScanReport, Scanner},
};

// ERRORS
// ================================================================================================

/// Errors that abort an attack run.
///
/// Failing to find the secret is not among them; it is reported as [AttackOutcome::NotFound].
#[derive(Debug, Error, PartialEq)]
pub enum AttackError {
    #[error("invalid attack parameters")]
    Params(#[from] ParamsError),
    #[error("malformed lattice basis")]
    Matrix(#[from] MatrixError),
    #[error("lattice reduction failed")]
    Reduction(#[from] LllError),
}

// CONFIG
// ================================================================================================

/// All options of an attack run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttackConfig {
    params: RingParams,
    keygen: KeyGenConfig,
    lll: LllConfig,
    scan: ScanConfig,
}

impl AttackConfig {
    /// Returns the default configuration for instances with the given parameters.
    pub fn new(params: RingParams) -> Self {
        Self { params, ..Self::default() }
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    pub fn keygen(&self) -> &KeyGenConfig {
        &self.keygen
    }

    pub fn lll(&self) -> &LllConfig {
        &self.lll
    }

    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn with_keygen(mut self, keygen: KeyGenConfig) -> Self {
        self.keygen = keygen;
        self
    }

    pub fn with_lll(mut self, lll: LllConfig) -> Self {
        self.lll = lll;
        self
    }

    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }
}

// REPORT
// ================================================================================================

/// Everything observed during one attack run.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    /// The reduced basis.
    pub reduced: IntMatrix,
    /// Work done by the reduction.
    pub stats: LllStats,
    /// `||b_0|| / vol(L)^(1/D)` of the reduced basis.
    pub hermite_factor: f64,
    /// The inspected rows.
    pub scan: ScanReport,
    /// Whether a secret was found.
    pub outcome: AttackOutcome,
}

impl AttackReport {
    /// Returns true if a secret was found.
    pub fn is_success(&self) -> bool {
        self.outcome.is_recovered()
    }
}

// ATTACK
// ================================================================================================

/// Runs the primal attack with a fixed configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attack {
    config: AttackConfig,
}

impl Attack {
    pub fn new(config: AttackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Attacks a public key without knowledge of the secret.
    ///
    /// A candidate is accepted when it is consistent with the public key (see
    /// [PublicKey::is_consistent]).
    ///
    /// # Errors
    /// Returns an error if the basis cannot be reduced.
    pub fn run(&self, public_key: &PublicKey) -> Result<AttackReport, AttackError> {
        let (reduced, stats, hermite_factor, scan) = self.reduce_and_scan(public_key)?;
        let outcome = scan.find_consistent(public_key);
        Ok(AttackReport { reduced, stats, hermite_factor, scan, outcome })
    }

    /// Attacks the public half of `key_pair` and accepts only a candidate equal to the true
    /// secret.
    ///
    /// # Errors
    /// Returns an error if the basis cannot be reduced.
    pub fn run_instance(&self, key_pair: &KeyPair) -> Result<AttackReport, AttackError> {
        let (reduced, stats, hermite_factor, scan) = self.reduce_and_scan(&key_pair.public)?;
        let outcome = scan.find_secret(&key_pair.secret.flattened_secret());
        Ok(AttackReport { reduced, stats, hermite_factor, scan, outcome })
    }

    /// Generates a fresh instance from `rng` and attacks it.
    ///
    /// # Errors
    /// Returns an error if the basis cannot be reduced.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(KeyPair, AttackReport), AttackError> {
        let key_pair = KeyPair::with_rng(self.config.params, self.config.keygen, rng);
        let report = self.run_instance(&key_pair)?;
        Ok((key_pair, report))
    }

    fn reduce_and_scan(
        &self,
        public_key: &PublicKey,
    ) -> Result<(IntMatrix, LllStats, f64, ScanReport), AttackError> {
        let basis = build_primal_basis(public_key);
        let mut reducer = LllReducer::new(basis, self.config.lll)?;
        let stats = *reducer.reduce()?;
        let reduced = reducer.into_basis();

        let hermite_factor = GramSchmidt::compute(&reduced)?.hermite_factor(reduced.row(0));
        let scan = Scanner::new(*public_key.params(), self.config.scan).scan(&reduced)?;
        Ok((reduced, stats, hermite_factor, scan))
    }
}

// TRIALS
// ================================================================================================

/// Result of one seeded trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub seed: u64,
    pub recovered: bool,
    pub stats: LllStats,
    pub hermite_factor: f64,
}

/// Summary of a batch of seeded trials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialSummary {
    /// Per-seed results, in the order the seeds were given.
    pub trials: Vec<TrialResult>,
}

impl TrialSummary {
    /// Number of trials run.
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    /// Returns true if no trial was run.
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Number of trials that recovered the secret.
    pub fn successes(&self) -> usize {
        self.trials.iter().filter(|t| t.recovered).count()
    }

    /// Fraction of trials that recovered the secret, or 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.successes() as f64 / self.len() as f64
        }
    }

    /// Seeds of the trials that did not recover the secret.
    pub fn failed_seeds(&self) -> impl Iterator<Item = u64> + '_ {
        self.trials.iter().filter(|t| !t.recovered).map(|t| t.seed)
    }
}

/// Runs one attack per seed, each on an instance drawn from `ChaCha20Rng::seed_from_u64(seed)`.
///
/// Trials are independent; with the `concurrent` feature they run on the rayon thread pool.
///
/// # Errors
/// Returns the first error raised by any trial.
pub fn run_trials(config: &AttackConfig, seeds: &[u64]) -> Result<TrialSummary, AttackError> {
    let attack = Attack::new(*config);
    let trial = |&seed: &u64| -> Result<TrialResult, AttackError> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let (_, report) = attack.run_with_rng(&mut rng)?;
        Ok(TrialResult {
            seed,
            recovered: report.is_success(),
            stats: report.stats,
            hermite_factor: report.hermite_factor,
        })
    };

    #[cfg(feature = "concurrent")]
    let trials = seeds.par_iter().map(trial).collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "concurrent"))]
    let trials = seeds.iter().map(trial).collect::<Result<Vec<_>, _>>()?;

    Ok(TrialSummary { trials })
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::ring::RingElement;

    fn small_config() -> AttackConfig {
        AttackConfig::new(RingParams::new(4, 1, 97, 1).unwrap())
    }

    fn poly(coefficients: [i64; 4]) -> RingElement {
        RingElement::new(coefficients.to_vec())
    }

    /// An instance of the small parameter set with `A = (a)`.
    fn small_instance(a: [i64; 4], s: [i64; 4], e: [i64; 4]) -> KeyPair {
        KeyPair::from_parts(
            *small_config().params(),
            KeyGenConfig::default(),
            vec![vec![poly(a)]],
            vec![poly(s)],
            vec![poly(e)],
        )
    }

    #[test]
    fn small_instance_is_broken() {
        let key_pair = small_instance([17, 42, 5, 88], [1, 0, -1, 1], [0, 1, -1, 0]);
        assert_eq!(key_pair.public.t(), &[poly([77, 29, 93, 63])]);

        let report = Attack::new(small_config()).run_instance(&key_pair).unwrap();
        assert_eq!(report.reduced.num_rows(), 9);
        assert!(report.stats.swaps > 0);
        assert!(report.is_success());
        assert_matches!(
            report.outcome,
            AttackOutcome::Recovered { ref secret, norm, .. }
                if secret == &vec![1, 0, -1, 1] && (norm * norm - 6.0).abs() < 1e-9
        );
    }

    #[test]
    fn attacker_side_check_recovers_the_secret() {
        // the scan also meets a longer candidate that is not consistent with the public key
        let key_pair = small_instance([60, 3, 71, 29], [-1, 1, 0, 1], [1, 0, 0, -1]);
        let report = Attack::new(small_config()).run(&key_pair.public).unwrap();

        assert_eq!(report.scan.candidates().count(), 2);
        assert_eq!(report.outcome.secret(), Some(&[-1, 1, 0, 1][..]));
        assert!(key_pair.public.is_consistent(key_pair.secret.s()));
    }

    #[test]
    fn trials_keep_seed_order() {
        let summary = run_trials(&small_config(), &[5, 1, 9]).unwrap();
        let seeds: Vec<u64> = summary.trials.iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![5, 1, 9]);
        assert_eq!(summary.len(), 3);
        assert!(summary.success_rate() <= 1.0);
    }

    #[test]
    fn empty_batch() {
        let summary = run_trials(&small_config(), &[]).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn reduction_errors_are_propagated() {
        let config = small_config().with_lll(LllConfig::default().with_max_iterations(Some(1)));
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert_matches!(
            Attack::new(config).run_with_rng(&mut rng),
            Err(AttackError::Reduction(LllError::IterationBudgetExhausted(1)))
        );
    }
}
