//! Function approximator benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Single-sample prediction latency (the real-time path) per approximator
//! - Batch prediction over the benchmark grid
//! - Training cost per approximator
//! - Scaling of GPR and LWR with the number of training samples
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fnapprox::prelude::*;
use nalgebra::DMatrix;
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use std::hint::black_box;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Benchmark grid for `dim` inputs.
fn grid(target: TargetFunction, dim: usize) -> SampleGrid {
    SampleGrid::generate(target, &TargetFunction::default_samples_per_dim(dim)).unwrap()
}

/// Uniformly scattered samples of the sum-of-sines target with Gaussian noise.
fn generate_noisy_sines(size: usize, seed: u64) -> (DMatrix<f64>, DMatrix<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x_dist = Uniform::new(0.0, 1.0).unwrap();
    let noise_dist = Normal::new(0.0, 0.05).unwrap();

    let inputs = DMatrix::from_fn(size, 1, |_, _| x_dist.sample(&mut rng));
    let targets = DMatrix::from_fn(size, 1, |r, _| {
        TargetFunction::SumOfSines.evaluate(&[inputs[(r, 0)]]) + noise_dist.sample(&mut rng)
    });
    (inputs, targets)
}

fn trained(kind: ApproximatorKind, grid: &SampleGrid) -> Approximator {
    let mut approximator = Approximator::new(kind, grid.input_dim());
    approximator.train(&grid.inputs, &grid.targets).unwrap();
    approximator
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_predict_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_row");
    group.sample_size(100);

    for dim in [1, 2] {
        let data = grid(TargetFunction::Standard, dim);
        for kind in ApproximatorKind::ALL {
            let approximator = trained(kind, &data);
            let mut buffer = approximator.prediction_buffer();
            let mut output = vec![0.0; approximator.expected_output_dim()];
            let input: Vec<f64> = data.inputs.row(data.len() / 2).iter().copied().collect();

            group.bench_with_input(
                BenchmarkId::new(kind.name(), format!("{dim}D")),
                &dim,
                |b, _| {
                    b.iter(|| {
                        approximator
                            .predict_row(black_box(&input), &mut output, &mut buffer)
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_predict_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_batch");
    group.sample_size(50);

    let data = grid(TargetFunction::Standard, 2);
    group.throughput(Throughput::Elements(data.len() as u64));
    for kind in ApproximatorKind::ALL {
        let approximator = trained(kind, &data);
        group.bench_function(kind.name(), |b| {
            b.iter(|| approximator.predict(black_box(&data.inputs)).unwrap())
        });
    }
    group.finish();
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(10);

    for dim in [1, 2] {
        let data = grid(TargetFunction::Standard, dim);
        for kind in ApproximatorKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.name(), format!("{dim}D")),
                &dim,
                |b, &dim| {
                    b.iter(|| {
                        let mut approximator = Approximator::new(kind, dim);
                        approximator
                            .train(black_box(&data.inputs), black_box(&data.targets))
                            .unwrap();
                        approximator
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");
    group.sample_size(10);

    for size in [50, 200, 800] {
        group.throughput(Throughput::Elements(size as u64));
        let (inputs, targets) = generate_noisy_sines(size, 42);

        for kind in [ApproximatorKind::Lwr, ApproximatorKind::Gpr] {
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    let mut approximator = Approximator::new(kind, 1);
                    approximator
                        .train(black_box(&inputs), black_box(&targets))
                        .unwrap();
                    approximator
                })
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_predict_row,
    bench_predict_batch,
    bench_train,
    bench_scalability,
);

criterion_main!(benches);
