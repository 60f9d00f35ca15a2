//! Benchmarks for the memoized counts, decoding and weighted sampling.
//!
//! Run with:
//! ```bash
//! cargo bench --bench counting
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_bigint::BigUint;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use treenum::sampler::ShapeDistribution;
use treenum::{Enumerator, PrimitiveSet};

fn enumerator() -> Enumerator {
    let mut pset = PrimitiveSet::new();
    for name in ["add", "sub", "mul", "div"] {
        pset.add_operator(name, 2).unwrap();
    }
    for name in ["sin", "cos", "exp"] {
        pset.add_operator(name, 1).unwrap();
    }
    pset.add_operator("fma", 3).unwrap();
    pset.add_fitting_parameter("c0");
    pset.add_variable("x");
    pset.add_variable("y");
    Enumerator::new(pset)
}

/// Deterministic random shape indices below `bound`.
fn random_shapes(seed: u64, count: usize, bound: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.random_range(0..bound)).collect()
}

// ============================================================================
// Benchmark: Counts (cold and warm caches)
// ============================================================================

fn bench_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("counts");

    for bound in [1_000u64, 1_000_000, u64::MAX / 2] {
        let shapes = random_shapes(42, 1000, bound);
        group.throughput(Throughput::Elements(shapes.len() as u64));

        group.bench_with_input(BenchmarkId::new("cold", bound), &shapes, |b, shapes| {
            b.iter_with_setup(enumerator, |en| {
                for &i in shapes {
                    let _ = en.count_equations(i).unwrap();
                }
            });
        });

        let warm = enumerator();
        for &i in &shapes {
            warm.count_equations(i).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("warm", bound), &shapes, |b, shapes| {
            b.iter(|| {
                for &i in shapes {
                    let _ = warm.count_equations(i).unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let en = enumerator();
    let zero = BigUint::ZERO;

    for bound in [1_000u64, 1_000_000] {
        let shapes = random_shapes(7, 200, bound);
        group.throughput(Throughput::Elements(shapes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(bound), &shapes, |b, shapes| {
            b.iter(|| {
                for &i in shapes {
                    let _ = en.decode(i, &zero, &zero, bound).unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Weighted sampling
// ============================================================================

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_once");

    for n in [100u64, 10_000] {
        let en = enumerator();
        en.count_q_prefix(n).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            b.iter(|| en.sample_once(n, ShapeDistribution::Weighted, &mut rng).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_counts, bench_decode, bench_sampling);
criterion_main!(benches);
