//! Criterion benches for the descent engine.
//!
//! - Closed-form families: cube, cross-polytope, simplex product.
//! - Face modes, automorphism exploitation, `i64` vs `BigInt`.
//!
//! Results live under `target/criterion`.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use descent::prelude::*;
use descent::random::random_simplex_product;
use descent::special::{cross_polytope, cube, LatticePolytope};

fn run<N: LatticeInt>(p: &LatticePolytope, cfg: DescentCfg, exploit: bool) -> BigRational {
    let mut sys = p.to_system::<N>().unwrap();
    sys.set_cfg(cfg);
    if exploit {
        sys.set_exploit_automs(true);
        sys.set_oracle(Arc::new(RefinementOracle));
    }
    sys.compute().unwrap();
    sys.multiplicity().clone()
}

fn bench_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("families");
    group.sample_size(20);
    for n in [3usize, 4, 5] {
        let p = cube(n);
        group.bench_with_input(BenchmarkId::new("cube", n), &p, |b, p| {
            b.iter(|| run::<i64>(p, DescentCfg::default(), false))
        });
        let q = cross_polytope(n);
        group.bench_with_input(BenchmarkId::new("cross", n), &q, |b, q| {
            b.iter(|| run::<i64>(q, DescentCfg::default(), false))
        });
    }
    group.finish();
}

fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("modes");
    group.sample_size(20);
    let p = cube(4);
    for mode in [FaceMode::Facet, FaceMode::Generator] {
        let cfg = DescentCfg {
            face_mode: Some(mode),
            ..DescentCfg::default()
        };
        group.bench_function(BenchmarkId::new("cube4", format!("{mode:?}")), |b| {
            b.iter(|| run::<i64>(&p, cfg.clone(), false))
        });
    }
    group.bench_function(BenchmarkId::new("cube4", "exploit"), |b| {
        b.iter(|| run::<i64>(&p, DescentCfg::default(), true))
    });
    group.finish();
}

fn bench_integer_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("integers");
    group.sample_size(20);
    let Ok(p) = random_simplex_product(2, 3, 3, 7) else {
        return;
    };
    group.bench_function("product_2x3/i64", |b| {
        b.iter(|| run::<i64>(&p, DescentCfg::default(), false))
    });
    group.bench_function("product_2x3/bigint", |b| {
        b.iter(|| run::<BigInt>(&p, DescentCfg::default(), false))
    });
    group.finish();
}

criterion_group!(benches, bench_families, bench_modes, bench_integer_types);
criterion_main!(benches);
