use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqrtm_core::{
    backend::{CpuAutodiffBackend, CpuBackend},
    test_utils::{random_wishart, seeded_rng, tensor_from_vec},
};
use sqrtm_kernels::{SqrtmConfig, sqrtm};

/// (batch, n) pairs.
const SHAPES: [(usize, usize); 3] = [(1, 23), (8, 23), (8, 64)];

fn wishart_batch(batch: usize, n: usize) -> Vec<f64> {
    let mut rng = seeded_rng(42);
    (0..batch).flat_map(|_| random_wishart(&mut rng, n)).collect()
}

fn config() -> SqrtmConfig {
    SqrtmConfig::default().with_threshold(1e-4)
}

fn bench_forward(c: &mut Criterion) {
    type B = CpuBackend<f32>;
    let device = Default::default();
    let mut group = c.benchmark_group("sqrtm_forward");
    group.measurement_time(Duration::from_secs(5));

    for (batch, n) in SHAPES {
        let data = wishart_batch(batch, n);
        group.throughput(Throughput::Elements((batch * n * n) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{batch}x{n}x{n}")),
            &data,
            |bench, data| {
                bench.iter(|| {
                    let x = tensor_from_vec::<B, 3>(data.clone(), [batch, n, n], &device);
                    sqrtm(x, &config()).unwrap()
                });
            },
        );
    }
    group.finish();
}

fn bench_backward(c: &mut Criterion) {
    type B = CpuAutodiffBackend<f32>;
    let device = Default::default();
    let mut group = c.benchmark_group("sqrtm_backward");
    group.measurement_time(Duration::from_secs(5));

    for (batch, n) in SHAPES {
        let data = wishart_batch(batch, n);
        group.throughput(Throughput::Elements((batch * n * n) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{batch}x{n}x{n}")),
            &data,
            |bench, data| {
                bench.iter(|| {
                    let x = tensor_from_vec::<B, 3>(data.clone(), [batch, n, n], &device)
                        .require_grad();
                    let roots = sqrtm(x.clone(), &config()).unwrap();
                    let grads = (roots.sqrt + roots.inv_sqrt).sum().backward();
                    x.grad(&grads)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_backward);
criterion_main!(benches);
