use std::fmt;

/// Names the argument of a batched call that failed shape validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The `(N, 2, 2)` batch compared against a reference segment.
    Batch,
    /// The `(2, 2)` reference segment.
    Reference,
    /// The first batch of a pairwise comparison.
    Left,
    /// The second batch of a pairwise comparison.
    Right,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Batch => write!(f, "batch"),
            Operand::Reference => write!(f, "reference segment"),
            Operand::Left => write!(f, "left batch"),
            Operand::Right => write!(f, "right batch"),
        }
    }
}

/// An input array does not have the shape required by the operation.
///
/// Shape errors abort the whole call; no partial mask is produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeMismatch {
    /// The array has the wrong number of axes.
    #[error("{operand} must have {expected} axes, found shape {found:?}")]
    Rank {
        operand: Operand,
        expected: usize,
        found: Vec<usize>,
    },

    /// The trailing `(endpoint, coordinate)` axes are not `(2, 2)`.
    #[error("{operand} must end in (2, 2) endpoint/coordinate axes, found shape {found:?}")]
    Segment { operand: Operand, found: Vec<usize> },

    /// Two batches compared row by row hold different numbers of segments.
    #[error("pairwise batches differ in length: {left} vs {right}")]
    BatchLength { left: usize, right: usize },
}

impl ShapeMismatch {
    /// Returns the argument responsible for the error, if a single one is.
    pub fn operand(&self) -> Option<Operand> {
        match self {
            ShapeMismatch::Rank { operand, .. } | ShapeMismatch::Segment { operand, .. } => {
                Some(*operand)
            }
            ShapeMismatch::BatchLength { .. } => None,
        }
    }
}
