#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::default_trait_access,
    //
    clippy::cast_precision_loss,
    clippy::float_cmp,
    //
    clippy::too_many_lines,
    clippy::type_complexity,
)]

//! Sqrtm Core
//!
//! This crate provides:
//! - `newton_schulz` - batched coupled iteration for `sqrt(X)` and `inv(sqrt(X))`
//! - `ErrorTrace` - sentinel-padded residual record
//! - `solve_sylvester` - batched `A W + W B = C` via the matrix sign function
//! - `sqrtm_vjp` / `sqrtm_jvp` - closed-form derivatives at the converged point
//! - Backend aliases and test utilities

pub mod backend;
pub mod error;
pub mod ops;
pub mod shape;
pub mod solver;
pub mod sylvester;
pub mod test_utils;
pub mod trace;
pub mod vjp;

pub use error::SqrtmError;
pub use shape::{MatrixShape, flatten_batch, unflatten_batch};
pub use solver::{SqrtmState, Termination, newton_schulz, newton_schulz_iteration};
pub use sqrtm_config::{ConfigError, ResidualReduction, ResidualScale, SqrtmConfig};
pub use sylvester::{SylvesterSolution, solve_sylvester, sylvester_sign_iteration};
pub use trace::{ErrorTrace, SENTINEL};
pub use vjp::{sqrtm_jvp, sqrtm_vjp};
