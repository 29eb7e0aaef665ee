//! Conformance Pipeline Benchmark
//!
//! Measures the stages a case goes through:
//! - Eager padding in each mode
//! - Tracing and conversion
//! - IR execution at FP32 and FP16
//! - A full precommit suite
//!
//! Run with: cargo bench --bench conformance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use opcheck::opcheck_frontend::PadModule;
use opcheck::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn input(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n).map(|i| (i % 97) as f32 / 97.0).collect();
    Tensor::from_data(data, shape.to_vec(), DataType::F32).unwrap()
}

/// Eager padding across modes on the 4-d case input
fn bench_eager_pad(c: &mut Criterion) {
    let mut group = c.benchmark_group("eager_pad");
    let x = input(&[1, 3, 14, 14]);
    group.throughput(Throughput::Elements(x.numel() as u64));

    for mode in [
        PadMode::Constant,
        PadMode::Reflect,
        PadMode::Replicate,
        PadMode::Circular,
    ] {
        let module = PadModule::new(vec![1, 2, 3, 4], mode, None);
        group.bench_with_input(BenchmarkId::new("pad", mode), &x, |b, x| {
            b.iter(|| module.forward(black_box(std::slice::from_ref(x))).unwrap());
        });
    }

    group.finish();
}

/// Trace plus conversion of a circular pad, the longest lowering
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let x = input(&[1, 3, 14, 14, 18]);
    let module = PadModule::new(vec![-1, -2, -1, -2, -1, -2], PadMode::Circular, None);
    let feeds = vec![("x".to_string(), x)];
    let converter = Converter::default();

    group.bench_function("trace", |b| {
        b.iter(|| trace_module(&module, "pad5d", black_box(&feeds)).unwrap());
    });

    let traced = trace_module(&module, "pad5d", &feeds).unwrap();
    group.bench_function("convert", |b| {
        b.iter(|| converter.convert(black_box(&traced)).unwrap());
    });

    group.finish();
}

/// IR execution at each precision
fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let x = input(&[1, 3, 14, 14]);
    let module = PadModule::new(vec![1, 2, 3, 4], PadMode::Reflect, None);
    let traced = trace_module(&module, "pad4d", &[("x".to_string(), x.clone())]).unwrap();
    let ir = Arc::new(Converter::default().convert(&traced).unwrap());

    for precision in [Precision::FP32, Precision::FP16] {
        let session = InferenceSession::new(
            Arc::clone(&ir),
            SessionOptions::new().with_precision(precision),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("run", precision), &x, |b, x| {
            b.iter(|| session.run_ordered(black_box(std::slice::from_ref(x))).unwrap());
        });
    }

    group.finish();
}

/// A whole suite, sequential against rayon
fn bench_suite(c: &mut Criterion) {
    let mut group = c.benchmark_group("suite");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for parallel in [false, true] {
        let driver = Driver::new(HarnessConfig::new().with_parallel(parallel));
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(BenchmarkId::new("addmm", label), |b| {
            b.iter(|| run_suite(&driver, "addmm").unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_eager_pad,
    bench_convert,
    bench_session,
    bench_suite
);
criterion_main!(benches);
