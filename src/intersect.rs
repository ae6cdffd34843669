//! Batched intersection entry points.
//!
//! [`intersects`] compares every segment of a batch against one reference segment, which is
//! broadcast across the batch. [`intersects_pairwise`] instead compares two batches of equal
//! length row by row. The two are deliberately separate: the reference operand of `intersects`
//! has no batch axis, and the operands are not interchangeable.

use ndarray::{Array1, ArrayBase, ArrayView3, Axis, Data, Dimension};

use crate::{
    batch::{batch_view, segment_at, single_segment},
    lanes, Operand, Segment, ShapeMismatch,
};

/// Tests each segment of `batch` for intersection with `reference`.
///
/// `batch` must have shape `(N, 2, 2)` and `reference` shape `(2, 2)`, with axes indexing the
/// segment, the endpoint and the coordinate (x, y) in that order. Arrays of any memory layout and
/// any dimensionality type are accepted; the rank is checked at runtime. Element `i` of the
/// returned mask is `true` _iff_ row `i` of `batch` intersects `reference`, as decided by
/// [`Segment::intersects`].
///
/// Returns a [`ShapeMismatch`] without testing any row if either array has the wrong shape.
pub fn intersects<S, D, T, E>(
    batch: &ArrayBase<S, D>,
    reference: &ArrayBase<T, E>,
) -> Result<Array1<bool>, ShapeMismatch>
where
    S: Data<Elem = f32>,
    D: Dimension,
    T: Data<Elem = f32>,
    E: Dimension,
{
    let batch = batch_view(batch, Operand::Batch)?;
    let reference = single_segment(reference, Operand::Reference)?;

    Ok(intersects_view(batch, &reference))
}

fn intersects_view(batch: ArrayView3<'_, f32>, reference: &Segment) -> Array1<bool> {
    let standard = batch.as_standard_layout();

    match standard.as_slice() {
        Some(coords) => Array1::from_vec(lanes::intersects_coords(coords, reference)),
        None => standard
            .outer_iter()
            .map(|row| segment_at(row).intersects(reference))
            .collect(),
    }
}

/// Tests row `i` of `batch_1` for intersection with row `i` of `batch_2`.
///
/// Both batches must have shape `(N, 2, 2)` for the same `N`.
pub fn intersects_pairwise<S, D, T, E>(
    batch_1: &ArrayBase<S, D>,
    batch_2: &ArrayBase<T, E>,
) -> Result<Array1<bool>, ShapeMismatch>
where
    S: Data<Elem = f32>,
    D: Dimension,
    T: Data<Elem = f32>,
    E: Dimension,
{
    let left = batch_view(batch_1, Operand::Left)?;
    let right = batch_view(batch_2, Operand::Right)?;

    let (left_len, right_len) = (left.len_of(Axis(0)), right.len_of(Axis(0)));
    if left_len != right_len {
        tracing::debug!(left_len, right_len, "rejecting pairwise batches of different length");
        return Err(ShapeMismatch::BatchLength {
            left: left_len,
            right: right_len,
        });
    }

    Ok(Array1::from_vec(lanes::intersects_row_pairs(left, right)))
}

/// Tests each of `segments` for intersection with `reference`.
pub fn intersects_slice(segments: &[Segment], reference: &Segment) -> Vec<bool> {
    lanes::intersects_segments(segments, reference)
}

/// Tests each of `segments`, given as `[[x0, y0], [x1, y1]]` arrays, for intersection with
/// `reference`.
pub fn intersects_arrays(segments: &[[[f32; 2]; 2]], reference: [[f32; 2]; 2]) -> Vec<bool> {
    lanes::intersects_coords(segments.as_flattened().as_flattened(), &reference.into())
}
