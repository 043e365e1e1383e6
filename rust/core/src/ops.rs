//! Batched matrix helpers shared by the forward solver and the Sylvester solve.
//!
//! Every tensor here is a `[batch, n, n]` stack; per-matrix scalars are kept
//! as `[batch, 1, 1]` so they broadcast against the stack.

use burn::tensor::{ElementConversion, Tensor, backend::Backend};
use sqrtm_config::ResidualReduction;

/// `[batch, n, n]` stack of identity matrices.
pub fn batched_eye<B: Backend>(batch: usize, n: usize, device: &B::Device) -> Tensor<B, 3> {
    Tensor::<B, 2>::eye(n, device)
        .unsqueeze_dim::<3>(0)
        .repeat_dim(0, batch)
}

/// Per-matrix Frobenius norm, shaped `[batch, 1, 1]`.
pub fn frobenius_norm<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 3> {
    (x.clone() * x).sum_dim(2).sum_dim(1).sqrt()
}

/// Transpose every matrix of the stack.
pub fn transpose<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 3> {
    x.swap_dims(1, 2)
}

/// `A @ C @ B` for stacks of matrices.
pub fn sandwich<B: Backend>(a: Tensor<B, 3>, c: Tensor<B, 3>, b: Tensor<B, 3>) -> Tensor<B, 3> {
    a.matmul(c).matmul(b)
}

/// Fold per-matrix values `[batch, 1, 1]` into the host-side stop signal.
///
/// Any non-finite entry makes the result non-finite, whatever the reduction.
pub fn reduce_to_scalar<B: Backend>(values: Tensor<B, 3>, reduction: ResidualReduction) -> f64 {
    let total = values.clone().sum().into_scalar().elem::<f64>();
    if !total.is_finite() {
        return total;
    }
    match reduction {
        ResidualReduction::Max => values.max().into_scalar().elem::<f64>(),
        ResidualReduction::Mean => values.mean().into_scalar().elem::<f64>(),
    }
}

#[cfg(all(test, feature = "ndarray"))]
mod tests {
    use burn::tensor::TensorData;

    use super::*;
    use crate::backend::CpuBackend;

    type B = CpuBackend<f64>;

    fn stack(data: Vec<f64>, dims: [usize; 3]) -> Tensor<B, 3> {
        Tensor::from_data(TensorData::new(data, dims), &Default::default())
    }

    fn to_vec(t: Tensor<B, 3>) -> Vec<f64> {
        t.to_data().convert::<f64>().to_vec().unwrap()
    }

    #[test]
    fn test_batched_eye() {
        let eye = batched_eye::<B>(2, 2, &Default::default());
        assert_eq!(eye.dims(), [2, 2, 2]);
        assert_eq!(to_vec(eye), vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_frobenius_norm_per_matrix() {
        let x = stack(vec![3.0, 0.0, 0.0, 4.0, 1.0, 1.0, 1.0, 1.0], [2, 2, 2]);
        let norms = frobenius_norm(x);
        assert_eq!(norms.dims(), [2, 1, 1]);
        let norms = to_vec(norms);
        assert!((norms[0] - 5.0).abs() < 1e-12);
        assert!((norms[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_transpose_each_matrix() {
        let x = stack(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], [2, 2, 2]);
        assert_eq!(
            to_vec(transpose(x)),
            vec![1.0, 3.0, 2.0, 4.0, 5.0, 7.0, 6.0, 8.0]
        );
    }

    #[test]
    fn test_reduce_max_and_mean() {
        let values = stack(vec![1.0, 3.0], [2, 1, 1]);
        assert_eq!(reduce_to_scalar(values.clone(), ResidualReduction::Max), 3.0);
        assert_eq!(reduce_to_scalar(values, ResidualReduction::Mean), 2.0);
    }

    #[test]
    fn test_reduce_propagates_nan() {
        let values = stack(vec![1.0, f64::NAN], [2, 1, 1]);
        assert!(reduce_to_scalar(values, ResidualReduction::Max).is_nan());
    }
}
