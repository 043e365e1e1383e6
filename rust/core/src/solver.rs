//! Coupled Newton–Schulz iteration for `sqrt(X)` and `inv(sqrt(X))`.
//!
//! The input is normalised by `s = ‖X‖_F (1 + regularization)` so its
//! spectrum sits inside `(0, 1)`, then
//!
//! ```text
//! W_k     = ½ Z_k Y_k
//! Y_{k+1} = 1.5 Y_k − Y_k W_k
//! Z_{k+1} = 1.5 Z_k − W_k Z_k
//! ```
//!
//! starting from `Y_0 = X / s`, `Z_0 = I`. Only batched matmuls are used.
//! The results are rescaled by `√s` on the way out.

use std::fmt;

use burn::tensor::{Tensor, backend::Backend};
use sqrtm_config::{ResidualScale, SqrtmConfig};
use tracing::trace;

use crate::{
    ErrorTrace, SqrtmError,
    ops::{batched_eye, frobenius_norm, reduce_to_scalar},
    shape::MatrixShape,
};

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residual at or below the threshold.
    Converged,
    /// Residual grew between two evaluations. The iterate of the earlier
    /// evaluation is returned.
    Stalled,
    /// Residual was NaN or infinite.
    Diverged,
    /// Ran out of iterations.
    MaxIterations,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::Stalled => write!(f, "stalled"),
            Termination::Diverged => write!(f, "diverged"),
            Termination::MaxIterations => write!(f, "max-iterations"),
        }
    }
}

/// Final iterates of [`newton_schulz`].
#[derive(Debug, Clone)]
pub struct SqrtmState<B: Backend> {
    /// `[batch, n, n]` approximation of `sqrt(X)`.
    pub sqrt: Tensor<B, 3>,
    /// `[batch, n, n]` approximation of `inv(sqrt(X))`.
    pub inv_sqrt: Tensor<B, 3>,
    pub errors: ErrorTrace,
    /// Iterations actually performed.
    pub iterations: usize,
    pub termination: Termination,
}

/// Validate `x` and `config`, then run [`newton_schulz_iteration`].
pub fn newton_schulz<B: Backend>(
    x: Tensor<B, 3>,
    config: &SqrtmConfig,
) -> Result<SqrtmState<B>, SqrtmError> {
    config.validate()?;
    MatrixShape::from_dims(&x.dims())?;
    Ok(newton_schulz_iteration(x, config))
}

/// Run the iteration on a `[batch, n, n]` stack.
///
/// Assumes a validated config and a non-empty square stack. Residuals are
/// evaluated every `inner_iterations` steps and after the last step; early
/// exits are only considered once `min_iterations` steps have run. When the
/// residual grows, the iterate of the previous evaluation is kept.
pub fn newton_schulz_iteration<B: Backend>(x: Tensor<B, 3>, config: &SqrtmConfig) -> SqrtmState<B> {
    let [batch, n, _] = x.dims();
    let device = x.device();

    let x_norm = frobenius_norm(x.clone());
    let scale = x_norm.clone().mul_scalar(1.0 + config.regularization);

    let mut y = x.clone() / scale.clone();
    let mut z = batched_eye::<B>(batch, n, &device);

    let inner = config.inner_iterations;
    let mut errors = ErrorTrace::new(config.trace_len());
    let mut previous = f64::INFINITY;
    let mut checkpoint = None;
    let mut termination = Termination::MaxIterations;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let w = z.clone().matmul(y.clone()).mul_scalar(0.5);
        let y_next = y.clone().mul_scalar(1.5) - y.matmul(w.clone());
        let z_next = z.clone().mul_scalar(1.5) - w.matmul(z);
        y = y_next;
        z = z_next;
        iterations += 1;

        if iterations % inner != 0 && iterations != config.max_iterations {
            continue;
        }

        let err = residual(&x, &x_norm, &y, &scale, config);
        errors.record(iterations, err);
        trace!("newton-schulz iteration {iterations}: residual {err:e}");

        if iterations >= config.min_iterations {
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
                if let Some((y_prev, z_prev)) = checkpoint.take() {
                    y = y_prev;
                    z = z_prev;
                }
                break;
            }
        }
        previous = err;
        checkpoint = Some((y.clone(), z.clone()));
    }

    log_termination("newton-schulz", termination, iterations, &errors, config.threshold);

    let root_scale = scale.sqrt();
    SqrtmState {
        sqrt: y * root_scale.clone(),
        inv_sqrt: z / root_scale,
        errors,
        iterations,
        termination,
    }
}

/// `‖X − s·Y Y‖_F` per matrix, divided by `‖X‖_F` in relative mode and
/// reduced over the batch.
fn residual<B: Backend>(
    x: &Tensor<B, 3>,
    x_norm: &Tensor<B, 3>,
    y: &Tensor<B, 3>,
    scale: &Tensor<B, 3>,
    config: &SqrtmConfig,
) -> f64 {
    let square = y.clone().matmul(y.clone()) * scale.clone();
    let per_matrix = frobenius_norm(x.clone() - square);
    let per_matrix = match config.residual {
        ResidualScale::Relative => per_matrix / x_norm.clone(),
        ResidualScale::Absolute => per_matrix,
    };
    reduce_to_scalar(per_matrix, config.reduction)
}

pub(crate) fn log_termination(
    solver: &str,
    termination: Termination,
    iterations: usize,
    errors: &ErrorTrace,
    threshold: f64,
) {
    let last = errors.last_valid().unwrap_or(f64::NAN);
    tracing::debug!("{solver}: {termination} after {iterations} iterations, residual {last:e}");
    match termination {
        Termination::Diverged => {
            tracing::warn!("{solver}: non-finite residual after {iterations} iterations");
        }
        _ if !errors.converged(threshold) => {
            tracing::warn!(
                "{solver}: residual {last:e} above threshold {threshold:e} after {iterations} iterations"
            );
        }
        _ => {}
    }
}
