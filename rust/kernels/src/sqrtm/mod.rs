mod api;
mod launch;
mod types;

pub use api::*;
pub use types::*;

#[cfg(all(test, feature = "ndarray"))]
mod tests;
