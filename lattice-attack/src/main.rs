use std::time::Instant;

use clap::Parser;
use lattice_attack::{
    Attack, AttackConfig, AttackError, AttackOutcome, KeyGenConfig, KeyPair, LllConfig,
    RingParams, ScanConfig, lll::DEFAULT_DELTA, run_trials,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Parser, Debug)]
#[command(name = "lattice-attack", about = "Primal LLL attack on a toy Kyber-like LWE instance")]
pub struct AttackArgs {
    /// Ring degree
    #[arg(short = 'n', long, default_value_t = 16)]
    pub n: usize,

    /// Module rank
    #[arg(short = 'k', long, default_value_t = 2)]
    pub k: usize,

    /// Modulus
    #[arg(short = 'q', long, default_value_t = 3329)]
    pub q: i64,

    /// Noise parameter of the centered binomial distribution
    #[arg(long, default_value_t = 2)]
    pub eta: u32,

    /// Lovász parameter
    #[arg(short = 'd', long, default_value_t = DEFAULT_DELTA)]
    pub delta: f64,

    /// Seed of the instance generator
    #[arg(short = 's', long, default_value_t = 0)]
    pub seed: u64,

    /// Number of shortest rows inspected after reduction
    #[arg(short = 'w', long, default_value_t = 10)]
    pub scan_window: usize,

    /// Reduce the public vector modulo q after adding the noise
    #[arg(long)]
    pub reduce_t: bool,

    /// Run this many consecutive seeds starting at --seed and report the success rate
    #[arg(short = 't', long)]
    pub trials: Option<u64>,
}

fn main() -> Result<(), AttackError> {
    let args = AttackArgs::parse();

    let params = RingParams::new(args.n, args.k, args.q, args.eta)?;
    let config = AttackConfig::new(params)
        .with_keygen(KeyGenConfig::default().with_reduced_public_vector(args.reduce_t))
        .with_lll(LllConfig::default().with_delta(args.delta)?)
        .with_scan(ScanConfig::default().with_window(args.scan_window));

    println!(
        "Parameters: N={}, K={}, Q={}, ETA={}, delta={}",
        params.n(),
        params.k(),
        params.q(),
        params.eta(),
        args.delta
    );

    match args.trials {
        Some(count) => trials(&config, args.seed, count),
        None => single(&config, args.seed),
    }
}

fn single(config: &AttackConfig, seed: u64) -> Result<(), AttackError> {
    let params = *config.params();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    println!("[Gen] Generating instance (seed {seed})...");
    let key_pair = KeyPair::with_rng(params, *config.keygen(), &mut rng);
    let secret = key_pair.secret.flattened_secret();
    println!("[Gen] Secret prefix: {:?}", &secret[..secret.len().min(8)]);

    println!("[Lattice] Dimension: {}", params.lattice_dim());

    println!("[LLL] Reducing...");
    let now = Instant::now();
    let report = Attack::new(*config).run_instance(&key_pair)?;
    let elapsed = now.elapsed();
    println!(
        "[LLL] Done in {:.2?}: {} iterations, {} size reductions, {} swaps",
        elapsed, report.stats.iterations, report.stats.size_reductions, report.stats.swaps
    );
    println!("[LLL] Hermite factor: {:.6}", report.hermite_factor);

    for row in report.scan.rows() {
        println!(
            "[Scan] row {:>3}  norm {:>8.3}  last {:>6}",
            row.index,
            row.norm(),
            row.last_coordinate
        );
    }

    match &report.outcome {
        AttackOutcome::Recovered { row, norm, secret } => {
            println!("[Result] SUCCESS: secret recovered from row {row} (norm {norm:.3})");
            println!("[Result] Recovered prefix: {:?}", &secret[..secret.len().min(8)]);
        },
        AttackOutcome::NotFound { suspicious } => {
            for s in suspicious {
                println!(
                    "[Result] suspicious row {} (norm {:.3}, last {})",
                    s.row, s.norm, s.last_coordinate
                );
            }
            println!("[Result] FAILURE: secret not found among the shortest rows");
        },
    }

    Ok(())
}

fn trials(config: &AttackConfig, first_seed: u64, count: u64) -> Result<(), AttackError> {
    let seeds: Vec<u64> = (first_seed..first_seed.saturating_add(count)).collect();
    println!("[Trials] Running {} seeded attacks...", seeds.len());

    let now = Instant::now();
    let summary = run_trials(config, &seeds)?;
    let elapsed = now.elapsed();

    for trial in &summary.trials {
        println!(
            "[Trials] seed {:>4}: {}  ({} swaps, hermite {:.4})",
            trial.seed,
            if trial.recovered { "recovered" } else { "not found" },
            trial.stats.swaps,
            trial.hermite_factor
        );
    }
    println!(
        "[Result] {}/{} recovered ({:.0}%) in {:.2?}",
        summary.successes(),
        summary.len(),
        summary.success_rate() * 100.0,
        elapsed
    );

    Ok(())
}
