//! Gradient tests for the square-root kernels against central finite differences.

use burn::tensor::Tensor;
use sqrtm_config::SqrtmConfig;
use sqrtm_core::{
    backend::{CpuAutodiffBackend, CpuBackend},
    test_utils::{
        assert_data_close, init_tracing, random_matrix, random_spd, seeded_rng, tensor_from_vec,
        tensor_to_vec,
    },
};
use test_case::test_case;

use super::{inv_sqrtm_only, sqrtm, sqrtm_only};

type B = CpuAutodiffBackend<f64>;

const EPSILON: f64 = 1e-6;
const TRIALS: u64 = 10;

#[derive(Debug, Clone, Copy)]
enum Variant {
    Sqrt,
    InvSqrt,
    SqrtPlusInvSqrt,
    SqrtOnly,
    InvSqrtOnly,
}

fn config() -> SqrtmConfig {
    SqrtmConfig::default().with_threshold(1e-12)
}

fn apply(variant: Variant, x: Tensor<B, 2>) -> Tensor<B, 2> {
    let config = config();
    match variant {
        Variant::Sqrt => sqrtm(x, &config).unwrap().sqrt,
        Variant::InvSqrt => sqrtm(x, &config).unwrap().inv_sqrt,
        Variant::SqrtPlusInvSqrt => {
            let roots = sqrtm(x, &config).unwrap();
            roots.sqrt + roots.inv_sqrt
        }
        Variant::SqrtOnly => sqrtm_only(x, &config).unwrap(),
        Variant::InvSqrtOnly => inv_sqrtm_only(x, &config).unwrap(),
    }
}

/// Scalar test function `t ↦ Σ f(M0 (M1 + t D)) ⊙ U`.
///
/// `M0 (M1 + t D)` is a product of two SPD matrices near `t = 0`: positive
/// spectrum, not symmetric.
struct Probe {
    m0: Tensor<B, 2>,
    m1: Tensor<B, 2>,
    direction: Tensor<B, 2>,
    unit: Tensor<B, 2>,
}

impl Probe {
    fn new(dim: usize, seed: u64) -> Self {
        let device = Default::default();
        let mut rng = seeded_rng(seed);
        let m0 = random_spd(&mut rng, dim);
        let m1 = random_spd(&mut rng, dim);
        let direction = random_spd(&mut rng, dim);
        let mut unit = random_matrix(&mut rng, dim * dim);
        let norm = unit.iter().map(|v| v * v).sum::<f64>().sqrt();
        unit.iter_mut().for_each(|v| *v /= norm);

        Self {
            m0: tensor_from_vec(m0, [dim, dim], &device),
            m1: tensor_from_vec(m1, [dim, dim], &device),
            direction: tensor_from_vec(direction, [dim, dim], &device),
            unit: tensor_from_vec(unit, [dim, dim], &device),
        }
    }

    fn eval(&self, variant: Variant, t: Tensor<B, 1>) -> Tensor<B, 1> {
        let shift = self.direction.clone() * t.reshape([1, 1]);
        let x = self.m0.clone().matmul(self.m1.clone() + shift);
        (apply(variant, x) * self.unit.clone()).sum()
    }

    fn eval_at(&self, variant: Variant, t: f64) -> f64 {
        let t = Tensor::<B, 1>::from_floats([t], &Default::default());
        tensor_to_vec(self.eval(variant, t))[0]
    }

    fn finite_difference(&self, variant: Variant) -> f64 {
        (self.eval_at(variant, EPSILON) - self.eval_at(variant, -EPSILON)) / (2.0 * EPSILON)
    }

    fn gradient(&self, variant: Variant) -> f64 {
        let t = Tensor::<B, 1>::from_floats([0.0], &Default::default()).require_grad();
        let grads = self.eval(variant, t.clone()).backward();
        let grad: Tensor<CpuBackend<f64>, 1> = t.grad(&grads).unwrap();
        tensor_to_vec(grad)[0]
    }
}

#[test_case(Variant::Sqrt, 3, 1e-6, 1e-6 ; "sqrtm_sqrt_dim3")]
#[test_case(Variant::InvSqrt, 3, 1e-8, 1e-8 ; "sqrtm_inv_sqrt_dim3")]
#[test_case(Variant::SqrtPlusInvSqrt, 3, 1e-8, 1e-8 ; "sqrtm_sum_dim3")]
#[test_case(Variant::SqrtOnly, 3, 1e-8, 1e-8 ; "sqrtm_only_dim3")]
#[test_case(Variant::InvSqrtOnly, 2, 1e-8, 1e-8 ; "inv_sqrtm_only_dim2")]
#[test_case(Variant::Sqrt, 2, 1e-6, 1e-6 ; "sqrtm_sqrt_dim2")]
#[test_case(Variant::InvSqrtOnly, 3, 1e-8, 1e-8 ; "inv_sqrtm_only_dim3")]
fn test_grad_matches_finite_difference(variant: Variant, dim: usize, rtol: f64, atol: f64) {
    init_tracing();
    for trial in 0..TRIALS {
        let probe = Probe::new(dim, 1000 * dim as u64 + trial);
        let expected = probe.finite_difference(variant);
        let actual = probe.gradient(variant);
        assert_data_close(
            &[actual],
            &[expected],
            rtol,
            atol,
            &format!("{variant:?} dim {dim} trial {trial}"),
        );
    }
}

/// Gradients of a batched call equal the per-matrix gradients.
#[test]
fn test_batched_grad_matches_single() {
    let device = Default::default();
    let mut rng = seeded_rng(77);
    let n = 3;
    let a = random_spd(&mut rng, n);
    let b = random_spd(&mut rng, n);

    let batched_data: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let batched = tensor_from_vec::<B, 3>(batched_data, [2, n, n], &device).require_grad();
    let roots = sqrtm(batched.clone(), &config()).unwrap();
    let grads = (roots.sqrt + roots.inv_sqrt).sum().backward();
    let batched_grad = tensor_to_vec(batched.grad(&grads).unwrap());

    for (i, data) in [a, b].into_iter().enumerate() {
        let single = tensor_from_vec::<B, 2>(data, [n, n], &device).require_grad();
        let roots = sqrtm(single.clone(), &config()).unwrap();
        let grads = (roots.sqrt + roots.inv_sqrt).sum().backward();
        let single_grad = tensor_to_vec(single.grad(&grads).unwrap());
        assert_data_close(
            &batched_grad[i * n * n..(i + 1) * n * n],
            &single_grad,
            1e-10,
            1e-10,
            &format!("batch element {i}"),
        );
    }
}

/// Only the used output contributes; an unused `inv_sqrt` adds nothing.
#[test]
fn test_unused_output_does_not_contribute() {
    let device = Default::default();
    let mut rng = seeded_rng(5);
    let data = random_spd(&mut rng, 3);

    let x = tensor_from_vec::<B, 2>(data.clone(), [3, 3], &device).require_grad();
    let grads = sqrtm(x.clone(), &config()).unwrap().sqrt.sum().backward();
    let full = tensor_to_vec(x.grad(&grads).unwrap());

    let x = tensor_from_vec::<B, 2>(data, [3, 3], &device).require_grad();
    let grads = sqrtm_only(x.clone(), &config()).unwrap().sum().backward();
    let only = tensor_to_vec(x.grad(&grads).unwrap());

    assert_data_close(&full, &only, 1e-12, 1e-12, "sqrt cotangent");
}

#[test]
fn test_trace_survives_autodiff() {
    let device = Default::default();
    let x = tensor_from_vec::<B, 2>(random_spd(&mut seeded_rng(8), 4), [4, 4], &device);
    let roots = sqrtm(x, &config()).unwrap();
    assert!(roots.converged(1e-12));
    assert_eq!(roots.errors.len(), config().trace_len());
}
