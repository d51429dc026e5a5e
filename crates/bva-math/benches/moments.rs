//! Criterion benchmarks for `bva-math`.
//!
//! Compares the incremental accumulator with the two-pass reference on
//! sample counts typical of a crowded efficiency bin.

use bva_math::{population_std, RunningMoments};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn samples(len: usize) -> Vec<f64> {
    // Deterministic ratios k/7 as produced by 7-photon windows.
    (0..len).map(|i| ((i * 31 + 3) % 8) as f64 / 7.0).collect()
}

fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("std");

    for len in [64usize, 1_024, 65_536] {
        let v = samples(len);

        group.bench_with_input(BenchmarkId::new("two_pass", len), &v, |b, v| {
            b.iter(|| black_box(population_std(black_box(v))));
        });

        group.bench_with_input(BenchmarkId::new("running", len), &v, |b, v| {
            b.iter(|| {
                let m: RunningMoments = black_box(v).iter().copied().collect();
                black_box(m.population_std())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reductions);
criterion_main!(benches);
