use burn::tensor::{Tensor, TensorPrimitive, backend::Backend};
use sqrtm_config::SqrtmConfig;
use sqrtm_core::{ErrorTrace, SqrtmError, flatten_batch, unflatten_batch};

use super::{
    launch::unpack,
    types::{InvSqrtmOnlyKernel, SqrtmInput, SqrtmKernel, SqrtmOnlyKernel},
};
use crate::kernel::MatrixKernelBackend;

/// Square root, inverse square root and the residual trace of one solve.
#[derive(Debug, Clone)]
pub struct Sqrtm<B: Backend, const D: usize> {
    pub sqrt: Tensor<B, D>,
    pub inv_sqrt: Tensor<B, D>,
    /// Informational only; gradients never flow through it.
    pub errors: ErrorTrace,
}

impl<B: Backend, const D: usize> Sqrtm<B, D> {
    /// Whether the last recorded residual is within `threshold`.
    #[must_use]
    pub fn converged(&self, threshold: f64) -> bool {
        self.errors.converged(threshold)
    }
}

fn prepare<B: Backend, const D: usize>(
    x: Tensor<B, D>,
    config: &SqrtmConfig,
) -> Result<(SqrtmInput<B::FloatTensorPrimitive>, [usize; D]), SqrtmError> {
    config.validate()?;
    let (x, dims) = flatten_batch(x)?;
    tracing::debug!("sqrtm on {dims:?}");
    let inputs = SqrtmInput {
        x: x.into_primitive().tensor(),
    };
    Ok((inputs, dims))
}

fn finish<B: Backend, const D: usize>(
    primitive: B::FloatTensorPrimitive,
    dims: [usize; D],
) -> Tensor<B, D> {
    unflatten_batch(
        Tensor::<B, 3>::from_primitive(TensorPrimitive::Float(primitive)),
        dims,
    )
}

/// Principal square root and inverse square root of a batch of matrices.
///
/// `x` has shape `[..batch, n, n]`. Non-convergence is not an error: inspect
/// [`Sqrtm::errors`] before trusting the result or its gradients. When both
/// roots reach the loss their cotangents are summed before the single
/// backward solve.
pub fn sqrtm<B: MatrixKernelBackend<SqrtmKernel>, const D: usize>(
    x: Tensor<B, D>,
    config: &SqrtmConfig,
) -> Result<Sqrtm<B, D>, SqrtmError> {
    let (inputs, dims) = prepare(x, config)?;
    let (packed, errors) = B::forward(inputs, config.clone());
    let (sqrt, inv_sqrt) = unpack(Tensor::<B, 4>::from_primitive(TensorPrimitive::Float(packed)));
    Ok(Sqrtm {
        sqrt: unflatten_batch(sqrt, dims),
        inv_sqrt: unflatten_batch(inv_sqrt, dims),
        errors,
    })
}

/// Principal square root only.
pub fn sqrtm_only<B: MatrixKernelBackend<SqrtmOnlyKernel>, const D: usize>(
    x: Tensor<B, D>,
    config: &SqrtmConfig,
) -> Result<Tensor<B, D>, SqrtmError> {
    let (inputs, dims) = prepare(x, config)?;
    let (output, _errors) = B::forward(inputs, config.clone());
    Ok(finish(output, dims))
}

/// Inverse principal square root only.
pub fn inv_sqrtm_only<B: MatrixKernelBackend<InvSqrtmOnlyKernel>, const D: usize>(
    x: Tensor<B, D>,
    config: &SqrtmConfig,
) -> Result<Tensor<B, D>, SqrtmError> {
    let (inputs, dims) = prepare(x, config)?;
    let (output, _errors) = B::forward(inputs, config.clone());
    Ok(finish(output, dims))
}
