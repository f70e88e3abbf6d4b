//! LLL reduction benchmarks
//!
//! Reduces freshly built primal bases (rank 1 and the rank 2 toy Kyber instance) with the default
//! configuration, and with drift checks disabled to isolate their cost.

use std::{hint::black_box, time::Duration};

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use lattice_attack::{LllConfig, build_primal_basis, lll};

mod common;
use common::{RANKS, instance, params};

fn lll_primal_basis(c: &mut Criterion) {
    let mut group = c.benchmark_group("lll_primal_basis");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for &k in RANKS {
        let basis = build_primal_basis(&instance(params(k), 0).public);
        let dim = basis.num_rows();

        group.bench_with_input(BenchmarkId::new("default", dim), &basis, |b, basis| {
            b.iter_batched(
                || basis.clone(),
                |basis| lll::reduce(black_box(basis), LllConfig::default()),
                BatchSize::SmallInput,
            )
        });

        let unchecked = LllConfig::default().with_drift_check_interval(None);
        group.bench_with_input(BenchmarkId::new("no_drift_checks", dim), &basis, |b, basis| {
            b.iter_batched(
                || basis.clone(),
                |basis| lll::reduce(black_box(basis), unchecked),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(lll_benchmark_group, lll_primal_basis);
criterion_main!(lll_benchmark_group);
