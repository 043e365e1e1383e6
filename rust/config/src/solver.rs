//! Iteration and convergence settings for the square-root solver.

use serde::{Deserialize, Serialize};

use crate::{ResidualReduction, ResidualScale};

/// Settings shared by the Newton–Schulz forward solve and the Sylvester
/// solve of the backward pass.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SqrtmConfig {
    /// Hard cap on the number of iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// No early exit of any kind before this many iterations.
    #[serde(default)]
    pub min_iterations: usize,
    /// Residuals are measured every `inner_iterations` steps.
    /// Each measurement reads a scalar back from the device.
    #[serde(default = "default_inner_iterations")]
    pub inner_iterations: usize,
    /// Residual below which the batch counts as converged, in the units
    /// chosen by `residual`. Relative by default, unlike a raw
    /// `‖X − Y Y‖_F` bound; set `residual` to `Absolute` for that.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Stop level of the Sylvester solve behind the derivatives.
    ///
    /// Independent of `threshold`: a loose forward tolerance does not
    /// loosen the gradient at a converged point. The solve also stops once
    /// its residual stops decreasing, which is where `f32` ends up.
    #[serde(default = "default_backward_threshold")]
    pub backward_threshold: f64,
    /// Relative inflation of the normalising constant `‖X‖_F`.
    #[serde(default = "default_regularization")]
    pub regularization: f64,
    #[serde(default)]
    pub reduction: ResidualReduction,
    #[serde(default)]
    pub residual: ResidualScale,
}

fn default_max_iterations() -> usize {
    1000
}
fn default_inner_iterations() -> usize {
    1
}
fn default_threshold() -> f64 {
    1e-6
}
fn default_backward_threshold() -> f64 {
    1e-12
}
fn default_regularization() -> f64 {
    1e-3
}

impl Default for SqrtmConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_iterations: 0,
            inner_iterations: default_inner_iterations(),
            threshold: default_threshold(),
            backward_threshold: default_backward_threshold(),
            regularization: default_regularization(),
            reduction: ResidualReduction::default(),
            residual: ResidualScale::default(),
        }
    }
}

impl SqrtmConfig {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    #[must_use]
    pub fn with_inner_iterations(mut self, inner_iterations: usize) -> Self {
        self.inner_iterations = inner_iterations;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_backward_threshold(mut self, backward_threshold: f64) -> Self {
        self.backward_threshold = backward_threshold;
        self
    }

    #[must_use]
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    #[must_use]
    pub fn with_reduction(mut self, reduction: ResidualReduction) -> Self {
        self.reduction = reduction;
        self
    }

    #[must_use]
    pub fn with_residual(mut self, residual: ResidualScale) -> Self {
        self.residual = residual;
        self
    }

    /// Number of slots in the error trace: one per possible iteration.
    #[must_use]
    pub fn trace_len(&self) -> usize {
        self.max_iterations
    }

    /// Settings for the Sylvester solve of the derivative pass.
    ///
    /// Same cap, cadence and reduction, stopping at `backward_threshold`
    /// with no iteration floor.
    #[must_use]
    pub fn for_derivative(&self) -> Self {
        Self {
            min_iterations: 0,
            threshold: self.backward_threshold,
            residual: ResidualScale::Relative,
            ..self.clone()
        }
    }

    /// Check the invariants between fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroMaxIterations);
        }
        if self.inner_iterations == 0 {
            return Err(ConfigError::ZeroInnerIterations);
        }
        if self.min_iterations > self.max_iterations {
            return Err(ConfigError::MinAboveMax {
                min: self.min_iterations,
                max: self.max_iterations,
            });
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !self.backward_threshold.is_finite() || self.backward_threshold <= 0.0 {
            return Err(ConfigError::InvalidBackwardThreshold(self.backward_threshold));
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(ConfigError::InvalidRegularization(self.regularization));
        }
        Ok(())
    }
}

/// Errors raised by [`SqrtmConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_iterations must be positive")]
    ZeroMaxIterations,
    #[error("inner_iterations must be positive")]
    ZeroInnerIterations,
    #[error("min_iterations ({min}) exceeds max_iterations ({max})")]
    MinAboveMax { min: usize, max: usize },
    #[error("threshold must be finite and positive, got {0}")]
    InvalidThreshold(f64),
    #[error("backward_threshold must be finite and positive, got {0}")]
    InvalidBackwardThreshold(f64),
    #[error("regularization must be finite and non-negative, got {0}")]
    InvalidRegularization(f64),
}
