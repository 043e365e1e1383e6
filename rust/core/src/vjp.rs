//! Closed-form derivatives of `X ↦ (sqrt(X), inv(sqrt(X)))` at a converged point.
//!
//! Differentiating `Y Y = X` gives `Y dY + dY Y = dX`, and `Z = Y⁻¹` gives
//! `dZ = −Z dY Z`. Both directions reduce to one Sylvester solve.

use burn::tensor::{Tensor, backend::Backend};
use sqrtm_config::SqrtmConfig;

use crate::{
    SqrtmError,
    ops::{sandwich, transpose},
    shape::ensure_same_shape,
    sylvester::sylvester_sign_iteration,
};

/// Pull cotangents of `sqrt` and `inv_sqrt` back to the input.
///
/// `X̄ = W` where `Yᵀ W + W Yᵀ = Ȳ − Zᵀ Z̄ Zᵀ`. A missing cotangent counts
/// as zero. Shapes must already agree, this runs inside backward passes
/// where no error can be returned.
///
/// The solve stops on `config.backward_threshold`, never on the forward
/// `threshold`.
pub fn sqrtm_vjp<B: Backend>(
    sqrt: Tensor<B, 3>,
    inv_sqrt: Tensor<B, 3>,
    grad_sqrt: Option<Tensor<B, 3>>,
    grad_inv_sqrt: Option<Tensor<B, 3>>,
    config: &SqrtmConfig,
) -> Tensor<B, 3> {
    debug_assert_eq!(sqrt.dims(), inv_sqrt.dims());

    let inv_branch = grad_inv_sqrt.map(|grad| {
        debug_assert_eq!(grad.dims(), sqrt.dims());
        let inv_t = transpose(inv_sqrt);
        sandwich(inv_t.clone(), grad, inv_t).neg()
    });
    let rhs = match (grad_sqrt, inv_branch) {
        (Some(grad), Some(inv)) => grad + inv,
        (Some(grad), None) => grad,
        (None, Some(inv)) => inv,
        (None, None) => return sqrt.zeros_like(),
    };

    let sqrt_t = transpose(sqrt);
    sylvester_sign_iteration(sqrt_t.clone(), sqrt_t, rhs, &config.for_derivative()).solution
}

/// Push a tangent `dX` forward to `(dY, dZ)`.
pub fn sqrtm_jvp<B: Backend>(
    sqrt: Tensor<B, 3>,
    inv_sqrt: Tensor<B, 3>,
    tangent: Tensor<B, 3>,
    config: &SqrtmConfig,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>), SqrtmError> {
    config.validate()?;
    ensure_same_shape(&[
        ("sqrt", &sqrt),
        ("inv_sqrt", &inv_sqrt),
        ("tangent", &tangent),
    ])?;

    let d_sqrt =
        sylvester_sign_iteration(sqrt.clone(), sqrt, tangent, &config.for_derivative()).solution;
    let d_inv_sqrt = sandwich(inv_sqrt.clone(), d_sqrt.clone(), inv_sqrt).neg();
    Ok((d_sqrt, d_inv_sqrt))
}
