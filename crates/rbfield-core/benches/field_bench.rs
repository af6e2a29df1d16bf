// ─────────────────────────────────────────────────────────────────────
// RBField — Field and Driver Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the per-sample streaming path (target well
//! under 1 ms at 100 centers) and the field hot paths.

use std::f64::consts::TAU;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rbfield_core::{GeometricMemoryBenchmark, SignalProcessor};
use rbfield_physics::quantities::{energy, reflexivity};
use rbfield_physics::{evolve, spiral_seed, Point, RbfField};
use rbfield_types::BenchmarkConfig;

const SR: f64 = 44_100.0;

fn seeded(n: usize) -> RbfField {
    let mut field = RbfField::new(n, 2.5).expect("field");
    for i in 0..n {
        field.add_spec(&spiral_seed(i, n)).expect("seed");
    }
    field
}

// ── SignalProcessor.process_sample() ────────────────────────────────

fn bench_process_sample(c: &mut Criterion) {
    let mut proc = SignalProcessor::new(SR).expect("processor");
    for i in 0..2048 {
        proc.process_sample((TAU * 440.0 * i as f64 / SR).sin())
            .expect("warmup");
    }
    let mut i = 2048usize;
    c.bench_function("process_sample_100c", |b| {
        b.iter(|| {
            i += 1;
            proc.process_sample(black_box((TAU * 440.0 * i as f64 / SR).sin()))
        })
    });
}

// ── RbfField.evaluate() ─────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let field = seeded(1000);
    let x = Point::from([0.5, 0.5, 0.5, 0.5, 0.0, 0.5]);
    c.bench_function("evaluate_1000c", |b| b.iter(|| field.evaluate(black_box(&x))));
    c.bench_function("energy_1000c", |b| b.iter(|| energy(black_box(&field))));
}

// ── evolve() ────────────────────────────────────────────────────────

fn bench_evolve(c: &mut Criterion) {
    let mut field = seeded(500);
    c.bench_function("evolve_500c", |b| b.iter(|| evolve(&mut field, black_box(0.01))));
}

// ── reflexivity() ───────────────────────────────────────────────────

fn bench_reflexivity(c: &mut Criterion) {
    let field = seeded(200);
    c.bench_function("reflexivity_200c", |b| b.iter(|| reflexivity(black_box(&field))));
}

// ── GeometricMemoryBenchmark.run_cycle() ────────────────────────────

fn bench_memory_cycle(c: &mut Criterion) {
    let config = BenchmarkConfig::default();
    c.bench_function("memory_100_cycles", |b| {
        b.iter(|| {
            let mut bench = GeometricMemoryBenchmark::new(config.clone()).expect("benchmark");
            bench.initialize(100).expect("init");
            for _ in 0..100 {
                bench.run_cycle().expect("cycle");
            }
            bench.field().len()
        })
    });
}

criterion_group!(
    benches,
    bench_process_sample,
    bench_evaluate,
    bench_evolve,
    bench_reflexivity,
    bench_memory_cycle,
);
criterion_main!(benches);
