//! GPU backends run the iteration as ordinary tensor ops.
//!
//! `Fusion<B>` is handled directly rather than unwrapped: the Newton–Schulz
//! steps are plain matmuls and elementwise ops that the fusion runtime can
//! batch on its own.

use burn_cubecl::{BoolElement, CubeBackend, CubeRuntime, FloatElement, IntElement};
use burn_fusion::{Fusion, FusionBackend};

use crate::kernel::{MatrixKernel, MatrixKernelBackend};

impl<K, R, F, I, BT> MatrixKernelBackend<K> for CubeBackend<R, F, I, BT>
where
    K: MatrixKernel,
    R: CubeRuntime,
    F: FloatElement,
    I: IntElement,
    BT: BoolElement,
{
}

impl<K, B> MatrixKernelBackend<K> for Fusion<B>
where
    K: MatrixKernel,
    B: FusionBackend,
{
}
