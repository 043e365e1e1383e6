use crate::bundle::tensor_bundle;

tensor_bundle! {
    /// Input of every square-root kernel: a `[batch, n, n]` stack.
    pub struct SqrtmInput { x }
}

tensor_bundle! {
    /// Both iterates, saved by every square-root kernel for its backward pass.
    pub struct SqrtmOutput { sqrt, inv_sqrt }
}

/// Marker type for the kernel returning `sqrt(X)` and `inv(sqrt(X))`,
/// packed as `[2, batch, n, n]`.
#[derive(Debug, Clone, Copy)]
pub struct SqrtmKernel;

/// Marker type for the kernel returning only `sqrt(X)`.
#[derive(Debug, Clone, Copy)]
pub struct SqrtmOnlyKernel;

/// Marker type for the kernel returning only `inv(sqrt(X))`.
#[derive(Debug, Clone, Copy)]
pub struct InvSqrtmOnlyKernel;
