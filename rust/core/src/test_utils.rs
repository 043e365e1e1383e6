//! Shared test utilities: seeded random matrices and tolerance checks.
//!
//! Matrices are generated host-side as row-major `Vec<f64>` so the same seed
//! yields the same data on every backend.

use burn::tensor::{Tensor, TensorData, backend::Backend};
use rand::{RngExt, SeedableRng, rngs::StdRng};

/// Install a test-writer subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `len` entries drawn uniformly from `[-1, 1)`.
pub fn random_matrix(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

/// Random `n × n` orthogonal matrix (Gram–Schmidt on uniform columns).
pub fn random_orthogonal(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n);
    while columns.len() < n {
        let mut v = random_matrix(rng, n);
        for q in &columns {
            let proj: f64 = v.iter().zip(q).map(|(a, b)| a * b).sum();
            v.iter_mut().zip(q).for_each(|(a, b)| *a -= proj * b);
        }
        let norm = v.iter().map(|a| a * a).sum::<f64>().sqrt();
        // Nearly dependent draw, try again.
        if norm < 1e-6 {
            continue;
        }
        v.iter_mut().for_each(|a| *a /= norm);
        columns.push(v);
    }
    let mut out = vec![0.0; n * n];
    for (j, column) in columns.iter().enumerate() {
        for (i, value) in column.iter().enumerate() {
            out[i * n + j] = *value;
        }
    }
    out
}

/// Random SPD matrix `Q diag(λ) Qᵀ` with `λ = 2^(2u − 1)`, so the
/// spectrum lies in `[0.5, 2]`.
pub fn random_spd(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let q = random_orthogonal(rng, n);
    let eigs: Vec<f64> = (0..n)
        .map(|_| 2f64.powf(2.0 * rng.random_range(0.0..1.0) - 1.0))
        .collect();
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            out[i * n + j] = (0..n).map(|k| q[i * n + k] * eigs[k] * q[j * n + k]).sum();
        }
    }
    out
}

/// Wishart-style SPD matrix `M Mᵀ` with `M` of shape `n × 2n`.
pub fn random_wishart(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let m = random_matrix(rng, n * 2 * n);
    let cols = 2 * n;
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            out[i * n + j] = (0..cols).map(|k| m[i * cols + k] * m[j * cols + k]).sum();
        }
    }
    out
}

/// Build a tensor from row-major `f64` data, converting to the backend's float type.
pub fn tensor_from_vec<B: Backend, const D: usize>(
    data: Vec<f64>,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    Tensor::from_data(
        TensorData::new(data, shape).convert::<B::FloatElem>(),
        device,
    )
}

/// Read a tensor back as `f64`, regardless of the backend's float type.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f64> {
    tensor.to_data().convert::<f64>().to_vec().unwrap()
}

/// Assert two slices are close within relative and absolute tolerance.
///
/// Uses the formula: |a - b| <= atol + rtol * |b|, checked element-wise.
pub fn assert_data_close(a: &[f64], b: &[f64], rtol: f64, atol: f64, name: &str) {
    assert_eq!(
        a.len(),
        b.len(),
        "{name}: Data sizes don't match: {} vs {}",
        a.len(),
        b.len()
    );

    let mut worst_excess = f64::NEG_INFINITY;
    let mut worst_idx = 0;
    for (i, (&av, &bv)) in a.iter().zip(b.iter()).enumerate() {
        let excess = (av - bv).abs() - (atol + rtol * bv.abs());
        // NaN never compares, force it to the top.
        if excess.is_nan() || excess > worst_excess {
            worst_excess = if excess.is_nan() { f64::INFINITY } else { excess };
            worst_idx = i;
        }
    }

    if a.is_empty() {
        return;
    }
    let (av, bv) = (a[worst_idx], b[worst_idx]);
    let diff = (av - bv).abs();
    let tolerance = atol + rtol * bv.abs();
    eprintln!("{name}: worst diff={diff:.3e} tol={tolerance:.3e} at idx {worst_idx}: tested={av:.6e} ref={bv:.6e}");
    assert!(
        worst_excess <= 0.0,
        "{name}: diff={diff:.3e} exceeds tolerance={tolerance:.3e} at idx {worst_idx}: tested={av:.6e} ref={bv:.6e}",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthogonal_columns() {
        let mut rng = seeded_rng(1);
        let n = 5;
        let q = random_orthogonal(&mut rng, n);
        for a in 0..n {
            for b in 0..n {
                let dot: f64 = (0..n).map(|i| q[i * n + a] * q[i * n + b]).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_spd_is_symmetric_with_bounded_trace() {
        let mut rng = seeded_rng(2);
        let n = 4;
        let m = random_spd(&mut rng, n);
        for i in 0..n {
            for j in 0..n {
                assert!((m[i * n + j] - m[j * n + i]).abs() < 1e-12);
            }
        }
        let trace: f64 = (0..n).map(|i| m[i * n + i]).sum();
        assert!((0.5 * n as f64..=2.0 * n as f64).contains(&trace));
    }

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(
            random_wishart(&mut seeded_rng(9), 3),
            random_wishart(&mut seeded_rng(9), 3)
        );
    }

    #[test]
    #[should_panic(expected = "exceeds tolerance")]
    fn test_assert_data_close_rejects() {
        assert_data_close(&[1.0, 2.0], &[1.0, 2.1], 1e-3, 1e-3, "close");
    }
}
