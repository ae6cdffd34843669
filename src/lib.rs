//! Batched 2D segment intersection tests.
//!
//! The crate answers a single question: for each segment of a batch, does it intersect a given
//! reference segment? The answer comes from the signs of four 2D cross products per segment, with
//! no division and no per-row branching, so the computation vectorizes and parallelizes freely.
//!
//! Batches are `ndarray` arrays of shape `(N, 2, 2)`, indexed by segment, endpoint and coordinate.
//! Callers that already hold typed segments can use the slice entry points instead.

#![cfg_attr(feature = "portable_simd", feature(portable_simd))]

use glam::Vec2;

mod batch;
mod error;
pub mod intersect;
mod lanes;

#[doc(inline)]
pub use error::{Operand, ShapeMismatch};
#[doc(inline)]
pub use intersect::{intersects, intersects_arrays, intersects_pairwise, intersects_slice};
#[doc(inline)]
pub use lanes::PARALLEL_THRESHOLD;

/// Computes the orientation term `u.y * v.x - u.x * v.y` of two 2D vectors.
///
/// This is the negated perp-dot product. Every batched kernel evaluates it with this exact operand
/// order.
#[inline]
pub fn cross(u: Vec2, v: Vec2) -> f32 {
    u.y * v.x - u.x * v.y
}

/// A 2D line segment.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Segment {
        Segment { a, b }
    }

    /// Returns the vector from `a` to `b`.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.b - self.a
    }

    /// Returns the same segment with its endpoints swapped.
    #[inline]
    #[must_use = "this returns the reversed segment, without modifying the original"]
    pub fn reversed(&self) -> Segment {
        Segment {
            a: self.b,
            b: self.a,
        }
    }

    /// Returns `true` if `self` intersects `reference`.
    ///
    /// Touching endpoints and collinear configurations count as intersecting: for collinear
    /// segments every orientation term vanishes, so they are reported as intersecting even when
    /// they do not overlap. A zero-length segment intersects `reference` _iff_ it lies on the line
    /// through `reference`. Any NaN coordinate makes the result `false`.
    #[inline]
    pub fn intersects(&self, reference: &Segment) -> bool {
        let Segment { a, b } = *self;
        let Segment { a: c, b: d } = *reference;

        let d0 = b - a;
        let d1 = d - c;

        // Sides of the reference line on which `a` and `b` lie.
        let p0 = cross(d1, d - a);
        let p1 = cross(d1, d - b);

        // Sides of the line through `self` on which `c` and `d` lie.
        let p2 = cross(d0, b - c);
        let p3 = cross(d0, b - d);

        (p0 * p1 <= 0.0) & (p2 * p3 <= 0.0)
    }
}

impl From<[[f32; 2]; 2]> for Segment {
    #[inline]
    fn from([a, b]: [[f32; 2]; 2]) -> Segment {
        Segment {
            a: Vec2::from(a),
            b: Vec2::from(b),
        }
    }
}

impl From<Segment> for [[f32; 2]; 2] {
    #[inline]
    fn from(segment: Segment) -> [[f32; 2]; 2] {
        [segment.a.to_array(), segment.b.to_array()]
    }
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
