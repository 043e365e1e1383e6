mod autodiff;
#[cfg(feature = "cubecl")]
mod cube;
#[cfg(feature = "ndarray")]
mod ndarray;
