//! Flattening of arbitrary-rank matrix batches to `[batch, n, n]`.

use burn::tensor::{Tensor, backend::Backend};

use crate::SqrtmError;

/// Geometry of a batch of square matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixShape {
    /// Product of all leading dimensions (1 for a single matrix).
    pub batch: usize,
    /// Side length of every matrix.
    pub n: usize,
}

impl MatrixShape {
    /// Validate `dims` as `[..batch, n, n]`.
    pub fn from_dims(dims: &[usize]) -> Result<Self, SqrtmError> {
        let rank = dims.len();
        if rank < 2 {
            return Err(SqrtmError::RankTooLow { rank });
        }
        let (rows, cols) = (dims[rank - 2], dims[rank - 1]);
        if rows != cols {
            return Err(SqrtmError::NotSquare { rows, cols });
        }
        let batch: usize = dims[..rank - 2].iter().product();
        if batch == 0 || rows == 0 {
            return Err(SqrtmError::Empty {
                shape: dims.to_vec(),
            });
        }
        Ok(Self { batch, n: rows })
    }

    #[must_use]
    pub fn dims(&self) -> [usize; 3] {
        [self.batch, self.n, self.n]
    }
}

/// Collapse the leading dimensions of `x` into a single batch axis.
pub fn flatten_batch<B: Backend, const D: usize>(
    x: Tensor<B, D>,
) -> Result<(Tensor<B, 3>, [usize; D]), SqrtmError> {
    let dims = x.dims();
    let shape = MatrixShape::from_dims(&dims)?;
    Ok((x.reshape(shape.dims()), dims))
}

/// Inverse of [`flatten_batch`].
pub fn unflatten_batch<B: Backend, const D: usize>(
    x: Tensor<B, 3>,
    dims: [usize; D],
) -> Tensor<B, D> {
    x.reshape(dims)
}

/// Check that every operand has the same `[batch, n, n]` shape as the first.
pub fn ensure_same_shape<B: Backend>(
    operands: &[(&'static str, &Tensor<B, 3>)],
) -> Result<MatrixShape, SqrtmError> {
    let Some((_, first)) = operands.first() else {
        return Err(SqrtmError::Empty { shape: Vec::new() });
    };
    let expected = first.dims();
    let shape = MatrixShape::from_dims(&expected)?;
    for (what, operand) in &operands[1..] {
        let actual = operand.dims();
        if actual != expected {
            return Err(SqrtmError::ShapeMismatch {
                what,
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
    }
    Ok(shape)
}
