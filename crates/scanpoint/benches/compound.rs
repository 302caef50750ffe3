//! Benchmarks for preparing and traversing nested scans.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scanpoint::{
    CompoundGenerator, Excluder, ScanGenerator,
    generators::{LineGenerator, SpiralGenerator},
    mutators::RandomOffsetMutator,
    roi::CircularRoi,
};

/// A square snake grid of `side` by `side` points, optionally masked by a
/// circle inscribed in it and perturbed by random offsets.
fn grid(side: usize, masked: bool, mutated: bool) -> CompoundGenerator {
    let extent = side as f64;
    let y = LineGenerator::new("y", "mm", 0.0, extent, side).expect("y line");
    let x = LineGenerator::new("x", "mm", 0.0, extent, side)
        .expect("x line")
        .alternating(true);
    let excluders = if masked {
        let circle = CircularRoi::new([extent / 2.0, extent / 2.0], extent / 2.0).expect("circle");
        vec![Excluder::new(circle, ["x", "y"]).expect("excluder")]
    } else {
        vec![]
    };
    let mutators = if mutated {
        vec![RandomOffsetMutator::new(1, [("x", 0.1), ("y", 0.1)]).expect("mutator").into()]
    } else {
        vec![]
    };
    CompoundGenerator::new(vec![y.into(), x.into()], excluders, mutators).expect("grid")
}

/// Benchmark `prepare_positions`, which evaluates excluder masks.
fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");

    for side in [16, 64, 256] {
        for masked in [false, true] {
            let label = if masked { "masked" } else { "open" };
            group.bench_function(BenchmarkId::new(label, side), |b| {
                b.iter(|| {
                    let mut g = grid(black_box(side), masked, false);
                    g.prepare_positions().expect("prepare");
                    g
                })
            });
        }
    }

    group.finish();
}

/// Benchmark full traversal of a prepared scan.
fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    let cases = [
        ("grid", false, false),
        ("masked", true, false),
        ("mutated", false, true),
    ];
    for (label, masked, mutated) in cases {
        let mut g = grid(64, masked, mutated);
        g.prepare_positions().expect("prepare");
        g.prepare_bounds();
        group.bench_function(BenchmarkId::new(label, 64), |b| {
            b.iter(|| g.iterator().expect("prepared").count())
        });
    }

    group.finish();
}

/// Benchmark random access into the middle of a masked scan.
fn bench_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("point");

    let spiral: ScanGenerator = SpiralGenerator::new(["x", "y"], &["mm"], [0.0, 0.0], 20.0, 1.0)
        .expect("spiral")
        .into();
    let mut g = CompoundGenerator::new(vec![spiral], vec![], vec![]).expect("spiral scan");
    g.prepare_positions().expect("prepare");
    g.prepare_bounds();
    let midpoint = g.size().expect("prepared") / 2;
    group.bench_function("spiral", |b| b.iter(|| g.point(black_box(midpoint))));

    let mut masked = grid(128, true, false);
    masked.prepare_positions().expect("prepare");
    masked.prepare_bounds();
    let midpoint = masked.size().expect("prepared") / 2;
    group.bench_function("masked_grid", |b| {
        b.iter(|| masked.point(black_box(midpoint)))
    });

    group.finish();
}

#[allow(missing_docs, clippy::missing_docs_in_private_items)]
mod bench_defs {
    use super::*;
    criterion_group!(benches, bench_prepare, bench_iterate, bench_point);
}

pub use bench_defs::benches;
criterion_main!(benches);
