//! Shape validation for `ndarray` inputs.

use glam::Vec2;
use ndarray::{ArrayBase, ArrayView2, ArrayView3, Data, Dimension, Ix2, Ix3};

use crate::{Operand, Segment, ShapeMismatch};

const SEGMENT_SHAPE: [usize; 2] = [2, 2];

fn rank_mismatch(operand: Operand, expected: usize, found: &[usize]) -> ShapeMismatch {
    tracing::debug!(%operand, expected, ?found, "rejecting input with wrong rank");
    ShapeMismatch::Rank {
        operand,
        expected,
        found: found.to_vec(),
    }
}

fn segment_mismatch(operand: Operand, found: &[usize]) -> ShapeMismatch {
    tracing::debug!(%operand, ?found, "rejecting input with wrong segment axes");
    ShapeMismatch::Segment {
        operand,
        found: found.to_vec(),
    }
}

/// Views `array` as an `(N, 2, 2)` batch of segments.
pub(crate) fn batch_view<S, D>(
    array: &ArrayBase<S, D>,
    operand: Operand,
) -> Result<ArrayView3<'_, f32>, ShapeMismatch>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let shape = array.shape();

    if shape.len() != 3 {
        return Err(rank_mismatch(operand, 3, shape));
    }

    if shape[1..] != SEGMENT_SHAPE {
        return Err(segment_mismatch(operand, shape));
    }

    array
        .view()
        .into_dimensionality::<Ix3>()
        .map_err(|_| rank_mismatch(operand, 3, shape))
}

/// Reads a single `(2, 2)` segment out of `array`.
pub(crate) fn single_segment<S, D>(
    array: &ArrayBase<S, D>,
    operand: Operand,
) -> Result<Segment, ShapeMismatch>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let shape = array.shape();

    if shape.len() != 2 {
        return Err(rank_mismatch(operand, 2, shape));
    }

    if *shape != SEGMENT_SHAPE {
        return Err(segment_mismatch(operand, shape));
    }

    let view = array
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| rank_mismatch(operand, 2, shape))?;

    Ok(segment_at(view))
}

/// Converts one `(2, 2)` row of a validated batch to a `Segment`.
#[inline]
pub(crate) fn segment_at(row: ArrayView2<'_, f32>) -> Segment {
    Segment {
        a: Vec2::new(row[[0, 0]], row[[0, 1]]),
        b: Vec2::new(row[[1, 0]], row[[1, 1]]),
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr2, arr3, Array, Array2, Array3, ArrayD, IxDyn};

    use super::*;

    #[test]
    fn accepts_batch() {
        let batch: Array3<f32> = arr3(&[[[0.0, 1.0], [2.0, 3.0]], [[4.0, 5.0], [6.0, 7.0]]]);
        let view = batch_view(&batch, Operand::Batch).unwrap();
        assert_eq!(view.shape(), &[2, 2, 2]);
        assert_eq!(
            segment_at(view.index_axis(ndarray::Axis(0), 1)),
            Segment::from([[4.0, 5.0], [6.0, 7.0]])
        );
    }

    #[test]
    fn accepts_empty_batch() {
        let batch = Array3::<f32>::zeros((0, 2, 2));
        assert_eq!(batch_view(&batch, Operand::Batch).unwrap().len(), 0);
    }

    #[test]
    fn accepts_dynamic_rank() {
        let batch = ArrayD::<f32>::zeros(IxDyn(&[5, 2, 2]));
        assert_eq!(batch_view(&batch, Operand::Batch).unwrap().shape(), &[5, 2, 2]);

        let reference = Array::from_shape_vec(IxDyn(&[2, 2]), vec![1.0_f32, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(
            single_segment(&reference, Operand::Reference).unwrap(),
            Segment::from([[1.0, 2.0], [3.0, 4.0]])
        );
    }

    #[test]
    fn rejects_wrong_rank() {
        let flat = ArrayD::<f32>::zeros(IxDyn(&[4, 4]));
        assert_eq!(
            batch_view(&flat, Operand::Left),
            Err(ShapeMismatch::Rank {
                operand: Operand::Left,
                expected: 3,
                found: vec![4, 4],
            })
        );

        let stacked = Array3::<f32>::zeros((1, 2, 2));
        assert_eq!(
            single_segment(&stacked, Operand::Reference),
            Err(ShapeMismatch::Rank {
                operand: Operand::Reference,
                expected: 2,
                found: vec![1, 2, 2],
            })
        );
    }

    #[test]
    fn rejects_wrong_segment_axes() {
        let batch = Array3::<f32>::zeros((3, 2, 3));
        assert_eq!(
            batch_view(&batch, Operand::Batch),
            Err(ShapeMismatch::Segment {
                operand: Operand::Batch,
                found: vec![3, 2, 3],
            })
        );

        let reference: Array2<f32> = arr2(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(
            single_segment(&reference, Operand::Reference),
            Err(ShapeMismatch::Segment {
                operand: Operand::Reference,
                found: vec![2, 3],
            })
        );
    }
}
