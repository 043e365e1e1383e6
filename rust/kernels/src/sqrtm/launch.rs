use std::fmt::Debug;

use burn::tensor::{Tensor, TensorPrimitive, backend::Backend, ops::FloatTensor};
use sqrtm_config::SqrtmConfig;
use sqrtm_core::{ErrorTrace, newton_schulz_iteration, sqrtm_vjp};

use super::types::{InvSqrtmOnlyKernel, SqrtmInput, SqrtmKernel, SqrtmOnlyKernel, SqrtmOutput};
use crate::kernel::MatrixKernel;

fn tensor<B: Backend, const D: usize>(primitive: FloatTensor<B>) -> Tensor<B, D> {
    Tensor::from_primitive(TensorPrimitive::Float(primitive))
}

fn primitive<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> FloatTensor<B> {
    tensor.into_primitive().tensor()
}

/// Split a packed `[2, batch, n, n]` tensor into its two stacks.
pub(crate) fn unpack<B: Backend>(packed: Tensor<B, 4>) -> (Tensor<B, 3>, Tensor<B, 3>) {
    let [_, batch, n, _] = packed.dims();
    let sqrt = packed.clone().narrow(0, 0, 1).reshape([batch, n, n]);
    let inv_sqrt = packed.narrow(0, 1, 1).reshape([batch, n, n]);
    (sqrt, inv_sqrt)
}

/// Run the iteration and keep both roots for the backward pass.
fn solve<B: Backend>(
    inputs: SqrtmInput<FloatTensor<B>>,
    config: &SqrtmConfig,
) -> (SqrtmOutput<FloatTensor<B>>, ErrorTrace) {
    let state = newton_schulz_iteration(tensor::<B, 3>(inputs.x), config);
    let roots = SqrtmOutput {
        sqrt: primitive(state.sqrt),
        inv_sqrt: primitive(state.inv_sqrt),
    };
    (roots, state.errors)
}

fn pull_back<B: Backend>(
    saved: SqrtmOutput<FloatTensor<B>>,
    grad_sqrt: Option<Tensor<B, 3>>,
    grad_inv_sqrt: Option<Tensor<B, 3>>,
    config: &SqrtmConfig,
) -> SqrtmInput<FloatTensor<B>> {
    let grad = sqrtm_vjp(
        tensor(saved.sqrt),
        tensor(saved.inv_sqrt),
        grad_sqrt,
        grad_inv_sqrt,
        config,
    );
    SqrtmInput { x: primitive(grad) }
}

impl MatrixKernel for SqrtmKernel {
    type Inputs<T: Debug + Clone + Send> = SqrtmInput<T>;
    type SavedState<T: Debug + Clone + Send> = SqrtmOutput<T>;
    type Config = SqrtmConfig;
    type Report = ErrorTrace;

    fn forward_launch<B: Backend>(
        inputs: SqrtmInput<FloatTensor<B>>,
        config: SqrtmConfig,
    ) -> (FloatTensor<B>, SqrtmOutput<FloatTensor<B>>, ErrorTrace) {
        let (roots, errors) = solve::<B>(inputs, &config);
        let packed = Tensor::stack::<4>(
            vec![
                tensor::<B, 3>(roots.sqrt.clone()),
                tensor::<B, 3>(roots.inv_sqrt.clone()),
            ],
            0,
        );
        (primitive(packed), roots, errors)
    }

    fn backward_launch<B: Backend>(
        saved: SqrtmOutput<FloatTensor<B>>,
        grad_output: FloatTensor<B>,
        config: SqrtmConfig,
    ) -> SqrtmInput<FloatTensor<B>> {
        let (grad_sqrt, grad_inv_sqrt) = unpack(tensor::<B, 4>(grad_output));
        pull_back::<B>(saved, Some(grad_sqrt), Some(grad_inv_sqrt), &config)
    }
}

impl MatrixKernel for SqrtmOnlyKernel {
    type Inputs<T: Debug + Clone + Send> = SqrtmInput<T>;
    type SavedState<T: Debug + Clone + Send> = SqrtmOutput<T>;
    type Config = SqrtmConfig;
    type Report = ErrorTrace;

    fn forward_launch<B: Backend>(
        inputs: SqrtmInput<FloatTensor<B>>,
        config: SqrtmConfig,
    ) -> (FloatTensor<B>, SqrtmOutput<FloatTensor<B>>, ErrorTrace) {
        let (roots, errors) = solve::<B>(inputs, &config);
        (roots.sqrt.clone(), roots, errors)
    }

    fn backward_launch<B: Backend>(
        saved: SqrtmOutput<FloatTensor<B>>,
        grad_output: FloatTensor<B>,
        config: SqrtmConfig,
    ) -> SqrtmInput<FloatTensor<B>> {
        pull_back::<B>(saved, Some(tensor(grad_output)), None, &config)
    }
}

impl MatrixKernel for InvSqrtmOnlyKernel {
    type Inputs<T: Debug + Clone + Send> = SqrtmInput<T>;
    type SavedState<T: Debug + Clone + Send> = SqrtmOutput<T>;
    type Config = SqrtmConfig;
    type Report = ErrorTrace;

    fn forward_launch<B: Backend>(
        inputs: SqrtmInput<FloatTensor<B>>,
        config: SqrtmConfig,
    ) -> (FloatTensor<B>, SqrtmOutput<FloatTensor<B>>, ErrorTrace) {
        let (roots, errors) = solve::<B>(inputs, &config);
        (roots.inv_sqrt.clone(), roots, errors)
    }

    fn backward_launch<B: Backend>(
        saved: SqrtmOutput<FloatTensor<B>>,
        grad_output: FloatTensor<B>,
        config: SqrtmConfig,
    ) -> SqrtmInput<FloatTensor<B>> {
        pull_back::<B>(saved, None, Some(tensor(grad_output)), &config)
    }
}
