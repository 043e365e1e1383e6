//! Contract violations detected before any iteration runs.
//!
//! Non-convergence is not an error: it is reported through the
//! [`ErrorTrace`](crate::ErrorTrace) and the returned iterates.

use sqrtm_config::ConfigError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SqrtmError {
    #[error("expected a tensor of rank >= 2, got rank {rank}")]
    RankTooLow { rank: usize },
    #[error("trailing dimensions must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("cannot take the square root of an empty batch (shape {shape:?})")]
    Empty { shape: Vec<usize> },
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
