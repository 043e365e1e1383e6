//! Batched Sylvester solve `A W + W B = C` through the matrix sign function.
//!
//! For `A` and `B` with spectra in the open right half-plane,
//!
//! ```text
//! sign([[A, C], [0, −B]]) = [[I, 2W], [0, −I]]
//! ```
//!
//! The Newton–Schulz sign iteration `H ← ½ H (3I − H²)` is applied to the
//! block matrix one block at a time, so only `n × n` batched matmuls appear:
//!
//! ```text
//! A' = ½ A (3I − A²)
//! B' = ½ B (3I − B²)
//! C' = ½ (3C − A² C + A C B − C B²)
//! ```
//!
//! All three blocks are first divided by `max(‖A‖_F, ‖B‖_F)`, which leaves
//! the solution unchanged and puts the spectra inside the unit disc.

use burn::tensor::{Tensor, backend::Backend};
use sqrtm_config::SqrtmConfig;
use tracing::trace;

use crate::{
    ErrorTrace, SqrtmError, Termination,
    ops::{batched_eye, frobenius_norm, reduce_to_scalar},
    shape::ensure_same_shape,
    solver::log_termination,
};

#[derive(Debug, Clone)]
pub struct SylvesterSolution<B: Backend> {
    /// `[batch, n, n]` solution `W`.
    pub solution: Tensor<B, 3>,
    pub errors: ErrorTrace,
    pub iterations: usize,
    pub termination: Termination,
}

/// Solve `A W + W B = C` for stacks of matrices after checking shapes and config.
pub fn solve_sylvester<B: Backend>(
    a: Tensor<B, 3>,
    b: Tensor<B, 3>,
    c: Tensor<B, 3>,
    config: &SqrtmConfig,
) -> Result<SylvesterSolution<B>, SqrtmError> {
    config.validate()?;
    ensure_same_shape(&[("a", &a), ("b", &b), ("c", &c)])?;
    Ok(sylvester_sign_iteration(a, b, c, config))
}

/// Sign iteration without validation.
///
/// The residual `max(‖I − A_k²‖_F, ‖I − B_k²‖_F) / √n` is measured every
/// `inner_iterations` steps. There is no `min_iterations` floor here: the
/// iteration stops as soon as the diagonal blocks reach the identity, or
/// keeps the previous estimate once rounding makes the residual grow.
pub fn sylvester_sign_iteration<B: Backend>(
    a: Tensor<B, 3>,
    b: Tensor<B, 3>,
    c: Tensor<B, 3>,
    config: &SqrtmConfig,
) -> SylvesterSolution<B> {
    let [batch, n, _] = a.dims();
    let device = a.device();
    let eye = batched_eye::<B>(batch, n, &device);

    let scale = frobenius_norm(a.clone()).max_pair(frobenius_norm(b.clone()));
    let mut a = a / scale.clone();
    let mut b = b / scale.clone();
    let mut c = c / scale;

    let inner = config.inner_iterations;
    let norm = (n as f64).sqrt();
    let mut errors = ErrorTrace::new(config.trace_len());
    let mut previous = f64::INFINITY;
    let mut checkpoint = None;
    let mut termination = Termination::MaxIterations;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let a_sq = a.clone().matmul(a.clone());
        let b_sq = b.clone().matmul(b.clone());

        let c_next = (c.clone().mul_scalar(3.0) - a_sq.clone().matmul(c.clone())
            + a.clone().matmul(c.clone()).matmul(b.clone())
            - c.matmul(b_sq.clone()))
        .mul_scalar(0.5);
        let a_next = a.matmul(eye.clone().mul_scalar(3.0) - a_sq).mul_scalar(0.5);
        let b_next = b.matmul(eye.clone().mul_scalar(3.0) - b_sq).mul_scalar(0.5);
        a = a_next;
        b = b_next;
        c = c_next;
        iterations += 1;

        if iterations % inner != 0 && iterations != config.max_iterations {
            continue;
        }

        let err = involution_residual(&a, &b, &eye, norm, config);
        errors.record(iterations, err);
        trace!("sylvester iteration {iterations}: residual {err:e}");

        if !err.is_finite() {
            termination = Termination::Diverged;
            break;
        }
        if err <= config.threshold {
            termination = Termination::Converged;
            break;
        }
        if err > previous {
            termination = Termination::Stalled;
            if let Some(c_prev) = checkpoint.take() {
                c = c_prev;
            }
            break;
        }
        previous = err;
        checkpoint = Some(c.clone());
    }

    log_termination("sylvester", termination, iterations, &errors, config.threshold);

    SylvesterSolution {
        solution: c.mul_scalar(0.5),
        errors,
        iterations,
        termination,
    }
}

fn involution_residual<B: Backend>(
    a: &Tensor<B, 3>,
    b: &Tensor<B, 3>,
    eye: &Tensor<B, 3>,
    norm: f64,
    config: &SqrtmConfig,
) -> f64 {
    let a_err = frobenius_norm(eye.clone() - a.clone().matmul(a.clone()));
    let b_err = frobenius_norm(eye.clone() - b.clone().matmul(b.clone()));
    reduce_to_scalar(a_err.max_pair(b_err).div_scalar(norm), config.reduction)
}
