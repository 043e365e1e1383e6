//! Custom backward for [`MatrixKernel`]s under `Autodiff`.
//!
//! The packed output gets one graph node whose parents are the kernel
//! inputs. Its backward consumes the accumulated cotangent once and hands
//! it to `backward_launch` on the inner backend.

use std::marker::PhantomData;

use burn::{
    backend::autodiff::{
        Autodiff,
        checkpoint::{base::Checkpointer, strategy::CheckpointStrategy},
        grads::Gradients,
        ops::{Backward, Ops, OpsKind},
    },
    tensor::{backend::Backend, ops::FloatTensor},
};

use crate::{
    TensorBundle,
    kernel::{MatrixKernel, MatrixKernelBackend},
};

#[derive(Debug)]
struct PackedBackward<K>(PhantomData<K>);

impl<K, B, const N: usize> Backward<B, N> for PackedBackward<K>
where
    K: MatrixKernel,
    B: Backend,
    K::Inputs<B::FloatTensorPrimitive>:
        TensorBundle<B::FloatTensorPrimitive, Array = [B::FloatTensorPrimitive; N]>,
{
    type State = (K::SavedState<B::FloatTensorPrimitive>, K::Config);

    fn backward(
        self,
        ops: Ops<Self::State, N>,
        grads: &mut Gradients,
        _checkpointer: &mut Checkpointer,
    ) {
        let grad_output = grads.consume::<B>(&ops.node);
        let (saved, config) = ops.state;

        let grad_inputs = K::backward_launch::<B>(saved, grad_output, config);

        for (grad, parent) in grad_inputs.into_array().into_iter().zip(ops.parents) {
            if let Some(node) = parent {
                grads.register::<B>(node.id, grad);
            }
        }
    }
}

impl<K, B, C, const N: usize> MatrixKernelBackend<K> for Autodiff<B, C>
where
    K: MatrixKernel,
    B: Backend,
    C: CheckpointStrategy,
    K::Inputs<B::FloatTensorPrimitive>:
        TensorBundle<B::FloatTensorPrimitive, Array = [B::FloatTensorPrimitive; N]>,
    K::Inputs<FloatTensor<Self>>: TensorBundle<FloatTensor<Self>, Array = [FloatTensor<Self>; N]>,
{
    fn forward(
        inputs: K::Inputs<FloatTensor<Self>>,
        config: K::Config,
    ) -> (FloatTensor<Self>, K::Report) {
        let inputs = inputs.into_array();
        let parents: [_; N] = inputs.each_ref().map(|t| t.node.clone());
        let primitives = K::Inputs::from_array(inputs.map(|t| t.primitive));

        let (output, saved, report) = K::forward_launch::<B>(primitives, config.clone());

        let output: FloatTensor<Self> = match PackedBackward::<K>(PhantomData)
            .prepare::<C>(parents)
            .compute_bound()
            .stateful()
        {
            OpsKind::Tracked(prep) => prep.finish((saved, config), output),
            OpsKind::UnTracked(prep) => prep.finish(output),
        };

        (output, report)
    }
}
