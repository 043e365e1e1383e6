//! Configuration types shared between the sqrtm crates.

mod solver;
mod types;

pub use solver::*;
pub use types::*;
