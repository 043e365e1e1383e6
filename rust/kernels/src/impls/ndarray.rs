use burn::backend::NdArray;

use crate::kernel::{MatrixKernel, MatrixKernelBackend};

impl<K: MatrixKernel> MatrixKernelBackend<K> for NdArray<f32> {}

impl<K: MatrixKernel> MatrixKernelBackend<K> for NdArray<f64> {}
