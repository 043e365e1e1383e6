#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::type_complexity,
)]

//! Sqrtm Kernels
//!
//! Matrix square root and inverse square root with closed-form gradients:
//! - `sqrtm` - both roots plus the residual trace
//! - `sqrtm_only` / `inv_sqrtm_only` - single-output variants
//! - `MatrixKernel` / `MatrixKernelBackend` - the autodiff boundary they are built on

pub mod bundle;
pub mod impls;
pub mod kernel;
pub mod sqrtm;

use burn::tensor::backend::Backend;

pub use bundle::TensorBundle;
pub use kernel::{MatrixKernel, MatrixKernelBackend};
pub use sqrtm::{
    InvSqrtmOnlyKernel, Sqrtm, SqrtmInput, SqrtmKernel, SqrtmOnlyKernel, SqrtmOutput,
    inv_sqrtm_only, sqrtm, sqrtm_only,
};
pub use sqrtm_config::{ConfigError, ResidualReduction, ResidualScale, SqrtmConfig};
pub use sqrtm_core::{ErrorTrace, SqrtmError};

/// Backends supporting every square-root kernel.
pub trait SqrtmBackend:
    MatrixKernelBackend<SqrtmKernel>
    + MatrixKernelBackend<SqrtmOnlyKernel>
    + MatrixKernelBackend<InvSqrtmOnlyKernel>
{
}

impl<B> SqrtmBackend for B where
    B: Backend
        + MatrixKernelBackend<SqrtmKernel>
        + MatrixKernelBackend<SqrtmOnlyKernel>
        + MatrixKernelBackend<InvSqrtmOnlyKernel>
{
}
