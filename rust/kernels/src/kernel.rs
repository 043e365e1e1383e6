//! Core traits for matrix kernels with hand-written derivatives.
//!
//! [`MatrixKernel`] marks a hard boundary for Burn's autodiff. At the
//! boundary the autodiff wrapper is stripped, the kernel runs on the inner
//! backend's primitives, and the result is rewrapped with a custom backward
//! op. The `impls` module provides the [`MatrixKernelBackend`]
//! implementations that do the unwrapping and gradient registration.
//!
//! # Usage
//!
//! 1. Define input and saved-state bundles using [`tensor_bundle!`](crate::tensor_bundle!)
//! 2. Implement [`MatrixKernel`] with `forward_launch` and `backward_launch`
//! 3. Call via `MatrixKernelBackend::forward()` and slice the packed output
//!
//! # Packed output
//!
//! A kernel returns one tensor. Kernels with several results of one shape
//! stack them along a new leading axis; the caller slices them apart with
//! ordinary tensor ops. Burn then sums the cotangents of every slice that
//! reaches the loss on the single packed node, so `backward_launch` runs
//! once per call no matter how many results are used. Unused results
//! arrive as zero rows of the packed cotangent.

use std::fmt::Debug;

use burn::tensor::{backend::Backend, ops::FloatTensor};

use crate::bundle::TensorBundle;

/// A matrix operation with an analytic backward pass.
///
/// Launches are written against any plain backend. The input count lives in
/// the `Array` associated type of the input bundle.
pub trait MatrixKernel: 'static + Send + Debug + Clone {
    type Inputs<T: Debug + Clone + Send>: TensorBundle<T>;
    /// State saved from forward pass for backward. Only includes what's actually needed.
    type SavedState<T: Debug + Clone + Send>: TensorBundle<T>;
    type Config: Debug + Clone + Send + Sync + 'static;
    /// Host-side diagnostics of the forward pass. Never differentiated.
    type Report: Debug + Clone + Send;

    /// Returns the packed output, the state for `backward_launch` and the report.
    fn forward_launch<B: Backend>(
        inputs: Self::Inputs<FloatTensor<B>>,
        config: Self::Config,
    ) -> (
        FloatTensor<B>,
        Self::SavedState<FloatTensor<B>>,
        Self::Report,
    );

    /// Pull the cotangent of the packed output back to every input.
    fn backward_launch<B: Backend>(
        saved: Self::SavedState<FloatTensor<B>>,
        grad_output: FloatTensor<B>,
        config: Self::Config,
    ) -> Self::Inputs<FloatTensor<B>>;
}

// =============================================================================
// Backend trait
// =============================================================================

/// Backend trait for a specific kernel.
///
/// Plain backends keep the default method, which launches the kernel on
/// their own primitives and drops the saved state. `Autodiff` overrides it to
/// keep the state for its backward op.
pub trait MatrixKernelBackend<K: MatrixKernel>: Backend {
    fn forward(
        inputs: K::Inputs<FloatTensor<Self>>,
        config: K::Config,
    ) -> (FloatTensor<Self>, K::Report) {
        let (output, _saved, report) = K::forward_launch::<Self>(inputs, config);
        (output, report)
    }
}
