//! Benchmarks for candidate validation.
//!
//! Measures single-candidate validation for both forms and compares
//! sequential against parallel batch validation.

use combinefn::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;

struct Accum;

fn handle() -> OperationHandle {
    OperationHandle::new(())
}

fn base() -> Arc<Surface> {
    Arc::new(Surface::new("base").export(
        "MergeAccumulators",
        signature!(fn(Context, Accum, Accum) -> (Accum, Failure)),
        handle(),
    ))
}

/// Alternating valid and invalid candidates of both forms.
fn create_candidates(count: usize) -> Vec<Candidate> {
    let base = base();
    (0..count)
        .map(|i| match i % 4 {
            0 => Candidate::functional(format!("sum_{}", i), signature!(fn(i64, i64) -> i64), handle()),
            1 => Candidate::functional(format!("concat_{}", i), signature!(fn(String, i64) -> i64), handle()),
            2 => Candidate::structural(
                Surface::new(format!("mean_{}", i))
                    .delegate_to(base.clone())
                    .export("CreateAccumulator", signature!(fn() -> Accum), handle())
                    .export("AddInput", signature!(fn(Accum, f64) -> Accum), handle())
                    .export("ExtractOutput", signature!(fn(Accum) -> f64), handle()),
            ),
            _ => Candidate::structural(
                Surface::new(format!("broken_{}", i))
                    .delegate_to(base.clone())
                    .export("CreateAccumulator", signature!(fn(String) -> String), handle())
                    .export("Debug", signature!(fn(Accum) -> String), handle()),
            ),
        })
        .collect()
}

fn bench_single(c: &mut Criterion) {
    let candidates = create_candidates(4);
    let mut group = c.benchmark_group("single_candidate");

    for candidate in &candidates {
        group.bench_with_input(BenchmarkId::from_parameter(candidate.name()), candidate, |b, candidate| {
            b.iter(|| validate(black_box(candidate)))
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_validation");

    for count in [16, 256, 4096] {
        let candidates = create_candidates(count);
        group.throughput(Throughput::Elements(count as u64));

        let sequential = Validator::new(ValidatorOptions {
            parallel: false,
            max_threads: 0,
        });
        group.bench_with_input(BenchmarkId::new("sequential", count), &candidates, |b, candidates| {
            b.iter(|| sequential.validate_all(black_box(candidates)))
        });

        let parallel = Validator::default();
        group.bench_with_input(BenchmarkId::new("parallel", count), &candidates, |b, candidates| {
            b.iter(|| parallel.validate_all(black_box(candidates)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
