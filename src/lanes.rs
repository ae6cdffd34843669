//! Row kernels for batched intersection tests.
//!
//! Batches reach this module either as flat coordinate slices, four `f32`s per row laid out as
//! `[ax, ay, bx, by]`, or as typed segments. With the `portable_simd` feature, flat rows are
//! tested four at a time in `f32x4` lanes; with the `rayon` feature, batches of at least
//! [`PARALLEL_THRESHOLD`] rows are split into blocks tested on the rayon thread pool. Every
//! strategy performs the same operations in the same order as [`Segment::intersects`], so the
//! resulting masks are bit-for-bit identical.

use glam::Vec2;
use ndarray::{ArrayView3, Axis};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{batch::segment_at, Segment};

/// Minimum number of rows for which a batch is split across threads.
///
/// Only consulted when the `rayon` feature is enabled; smaller batches are always tested on the
/// calling thread.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Rows handed to each rayon task.
#[cfg(feature = "rayon")]
const BLOCK_ROWS: usize = 1024;

const COORDS_PER_ROW: usize = 4;

#[cfg(feature = "portable_simd")]
const STRATEGY: &str = "simd";
#[cfg(not(feature = "portable_simd"))]
const STRATEGY: &str = "scalar";

#[inline]
fn row_segment(row: &[f32]) -> Segment {
    Segment {
        a: Vec2::new(row[0], row[1]),
        b: Vec2::new(row[2], row[3]),
    }
}

fn fill_scalar(coords: &[f32], reference: &Segment, out: &mut [bool]) {
    for (row, hit) in coords.chunks_exact(COORDS_PER_ROW).zip(out) {
        *hit = row_segment(row).intersects(reference);
    }
}

// Tests four rows per iteration, then finishes the tail with the scalar kernel.
#[cfg(feature = "portable_simd")]
fn fill(coords: &[f32], reference: &Segment, out: &mut [bool]) {
    use std::simd::{cmp::SimdPartialOrd, f32x4};

    const LANES: usize = 4;

    let cx = f32x4::splat(reference.a.x);
    let cy = f32x4::splat(reference.a.y);
    let dx = f32x4::splat(reference.b.x);
    let dy = f32x4::splat(reference.b.y);
    let d1x = f32x4::splat(reference.b.x - reference.a.x);
    let d1y = f32x4::splat(reference.b.y - reference.a.y);
    let zero = f32x4::splat(0.0);

    let mut blocks = coords.chunks_exact(LANES * COORDS_PER_ROW);
    let mut hits = out.chunks_exact_mut(LANES);

    for (block, hit) in (&mut blocks).zip(&mut hits) {
        // De-interleave the four rows into one vector per coordinate.
        let lane = |offset: usize| {
            f32x4::from_array([
                block[offset],
                block[offset + 4],
                block[offset + 8],
                block[offset + 12],
            ])
        };
        let ax = lane(0);
        let ay = lane(1);
        let bx = lane(2);
        let by = lane(3);

        let d0x = bx - ax;
        let d0y = by - ay;

        // cross(u, v) = u.y * v.x - u.x * v.y
        let p0 = d1y * (dx - ax) - d1x * (dy - ay);
        let p1 = d1y * (dx - bx) - d1x * (dy - by);
        let p2 = d0y * (bx - cx) - d0x * (by - cy);
        let p3 = d0y * (bx - dx) - d0x * (by - dy);

        let mask = (p0 * p1).simd_le(zero) & (p2 * p3).simd_le(zero);
        hit.copy_from_slice(&mask.to_array());
    }

    fill_scalar(blocks.remainder(), reference, hits.into_remainder());
}

#[cfg(not(feature = "portable_simd"))]
#[inline]
fn fill(coords: &[f32], reference: &Segment, out: &mut [bool]) {
    fill_scalar(coords, reference, out);
}

/// Tests each row of a flat coordinate slice against `reference`.
pub(crate) fn intersects_coords(coords: &[f32], reference: &Segment) -> Vec<bool> {
    debug_assert_eq!(coords.len() % COORDS_PER_ROW, 0);

    let rows = coords.len() / COORDS_PER_ROW;
    let mut mask = vec![false; rows];

    #[cfg(feature = "rayon")]
    if rows >= PARALLEL_THRESHOLD {
        let _span = tracing::trace_span!("intersects", rows, strategy = "parallel").entered();
        mask.par_chunks_mut(BLOCK_ROWS)
            .zip(coords.par_chunks(BLOCK_ROWS * COORDS_PER_ROW))
            .for_each(|(out, block)| fill(block, reference, out));
        return mask;
    }

    let _span = tracing::trace_span!("intersects", rows, strategy = STRATEGY).entered();
    fill(coords, reference, &mut mask);
    mask
}

/// Tests each element of `segments` against `reference`.
pub(crate) fn intersects_segments(segments: &[Segment], reference: &Segment) -> Vec<bool> {
    let rows = segments.len();

    #[cfg(feature = "rayon")]
    if rows >= PARALLEL_THRESHOLD {
        let _span = tracing::trace_span!("intersects", rows, strategy = "parallel").entered();
        return segments
            .par_iter()
            .map(|segment| segment.intersects(reference))
            .collect();
    }

    let _span = tracing::trace_span!("intersects", rows, strategy = "scalar").entered();
    segments
        .iter()
        .map(|segment| segment.intersects(reference))
        .collect()
}

/// Tests row `i` of `left` against row `i` of `right`.
///
/// Both views must hold the same number of rows.
pub(crate) fn intersects_row_pairs(
    left: ArrayView3<'_, f32>,
    right: ArrayView3<'_, f32>,
) -> Vec<bool> {
    debug_assert_eq!(left.len_of(Axis(0)), right.len_of(Axis(0)));

    let rows = left.len_of(Axis(0));

    #[cfg(feature = "rayon")]
    if rows >= PARALLEL_THRESHOLD {
        let _span =
            tracing::trace_span!("intersects_pairwise", rows, strategy = "parallel").entered();
        return left
            .axis_iter(Axis(0))
            .into_par_iter()
            .zip(right.axis_iter(Axis(0)))
            .map(|(l, r)| segment_at(l).intersects(&segment_at(r)))
            .collect();
    }

    let _span = tracing::trace_span!("intersects_pairwise", rows, strategy = "scalar").entered();
    left.outer_iter()
        .zip(right.outer_iter())
        .map(|(l, r)| segment_at(l).intersects(&segment_at(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::tests::{random_segments, seg};

    fn flatten(segments: &[Segment]) -> Vec<f32> {
        segments
            .iter()
            .flat_map(|s| [s.a.x, s.a.y, s.b.x, s.b.y])
            .collect()
    }

    #[test]
    fn coords_match_single_pair() {
        crate::init_test_logging();

        let mut rng = StdRng::seed_from_u64(7);
        let reference = seg(-3.0, -5.0, 4.0, 6.0);

        // Lengths around the lane width exercise both the vector body and the scalar tail.
        for len in [0, 1, 3, 4, 5, 8, 17, 64] {
            let segments = random_segments(&mut rng, len);
            let expected: Vec<bool> = segments.iter().map(|s| s.intersects(&reference)).collect();

            assert_eq!(intersects_coords(&flatten(&segments), &reference), expected);
            assert_eq!(intersects_segments(&segments, &reference), expected);
        }
    }

    #[test]
    fn large_batches_match_single_pair() {
        crate::init_test_logging();

        let mut rng = StdRng::seed_from_u64(11);
        let reference = seg(-6.0, 2.0, 7.0, -1.0);
        let segments = random_segments(&mut rng, PARALLEL_THRESHOLD + 1027);
        let expected: Vec<bool> = segments.iter().map(|s| s.intersects(&reference)).collect();

        assert!(expected.iter().any(|&hit| hit));
        assert!(expected.iter().any(|&hit| !hit));
        assert_eq!(intersects_coords(&flatten(&segments), &reference), expected);
        assert_eq!(intersects_segments(&segments, &reference), expected);
    }

    #[test]
    fn nan_rows_in_lanes() {
        let reference = seg(0.0, 2.0, 2.0, 0.0);
        let mut segments = vec![seg(0.0, 0.0, 2.0, 2.0); 6];
        segments[1].a.x = f32::NAN;
        segments[4].b.y = f32::NAN;

        assert_eq!(
            intersects_coords(&flatten(&segments), &reference),
            [true, false, true, true, false, true]
        );
    }

    #[test]
    fn row_pairs_match_single_pair() {
        let mut rng = StdRng::seed_from_u64(13);
        let left = random_segments(&mut rng, 40);
        let right = random_segments(&mut rng, 40);

        let to_array = |segments: &[Segment]| {
            Array3::from_shape_vec((segments.len(), 2, 2), flatten(segments)).unwrap()
        };
        let (left_array, right_array) = (to_array(&left), to_array(&right));

        let expected: Vec<bool> = left
            .iter()
            .zip(&right)
            .map(|(l, r)| l.intersects(r))
            .collect();

        assert_eq!(
            intersects_row_pairs(left_array.view(), right_array.view()),
            expected
        );
    }
}
