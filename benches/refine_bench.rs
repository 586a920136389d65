use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nfindr::builder::NFindrBuilder;
use nfindr::core::SpectralDataset;
use nfindr::reduction::{DimensionalityReducer, PcaReducer};
use nfindr::refiner::EndmemberRefiner;
use nfindr::synthetic::{linear_mixture_scene, smooth_spectra};
use nfindr::volume::simplex_volume;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::hint::black_box;
use std::time::Duration;

const BANDS: usize = 100;
const SEED: u64 = 17;

fn scene(p: usize, npixels: usize) -> SpectralDataset {
    let truth = smooth_spectra(BANDS, p, SEED);
    linear_mixture_scene(&truth, npixels, 0.005, SEED + 1)
        .unwrap()
        .spectra
}

fn bench_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplex_volume");
    group.warm_up_time(Duration::from_millis(300));

    for d in [2usize, 5, 9] {
        let rows: Vec<Vec<f64>> = (0..d)
            .map(|r| {
                (0..=d)
                    .map(|k| if k == r + 1 { 1.0 } else { 0.1 * (r + k) as f64 })
                    .collect()
            })
            .collect();
        let vertices = DenseMatrix::from_2d_vec(&rows).unwrap();
        group.bench_function(BenchmarkId::new("dim", d), |b| {
            b.iter(|| black_box(simplex_volume(black_box(&vertices))))
        });
    }
    group.finish();
}

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("refine_one_sweep");
    group.warm_up_time(Duration::from_millis(300));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for (p, npixels) in [(4usize, 2_000usize), (8, 2_000), (8, 10_000)] {
        let data = scene(p, npixels);
        let reduced = PcaReducer::default().reduce(data.matrix(), p - 1).unwrap();
        let id = format!("p={}_n={}", p, npixels);

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_function(BenchmarkId::new(label, &id), |b| {
                b.iter_batched(
                    || {
                        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
                        EndmemberRefiner::random(&reduced, p, &mut rng)
                            .unwrap()
                            .with_parallel(parallel)
                    },
                    |mut refiner| black_box(refiner.sweep()),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("nfindr_build");
    group.warm_up_time(Duration::from_millis(300));
    group.sample_size(10);

    let data = scene(6, 5_000);
    group.bench_function("p=6_n=5000_iter=3", |b| {
        b.iter(|| {
            black_box(
                NFindrBuilder::new()
                    .with_endmembers(6)
                    .with_max_iter(3)
                    .with_seed(SEED)
                    .build(black_box(&data))
                    .unwrap(),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_volume, bench_refine, bench_end_to_end);
criterion_main!(benches);
