//! Backend aliases selected by cargo features.

#[cfg(feature = "ndarray")]
pub type CpuBackend<F = f64> = burn::backend::NdArray<F>;

#[cfg(feature = "ndarray")]
pub type CpuAutodiffBackend<F = f64> = burn::backend::Autodiff<CpuBackend<F>>;

#[cfg(feature = "cuda")]
pub type GpuBackend<F = f32> = burn::backend::Cuda<F>;

#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
pub type GpuBackend<F = f32> = burn::backend::Wgpu<F>;

#[cfg(all(feature = "cpu", not(any(feature = "cuda", feature = "wgpu"))))]
pub type GpuBackend<F = f32> = burn::backend::Cpu<F>;

#[cfg(any(feature = "cuda", feature = "wgpu", feature = "cpu"))]
pub type GpuAutodiffBackend<F = f32> = burn::backend::Autodiff<GpuBackend<F>>;
