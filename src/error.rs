use thiserror::Error;

/// Result type for the validating entry points
pub type Result<T> = core::result::Result<T, Error>;

/// Structural problems with the input found by [`crate::try_triangulate`] and
/// [`crate::Earcut::try_earcut`].
///
/// Geometric degeneracy (self-intersections, zero area, unbridgeable holes) is never an
/// error; it only yields fewer triangles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("dimension must be at least 2, got {0}")]
    InvalidDimension(usize),

    #[error("{len} coordinates can't be split into vertices of dimension {dim}")]
    RaggedCoordinates { len: usize, dim: usize },

    #[error("hole #{hole} starts at vertex {start}, but there are only {vertices} vertices")]
    HoleIndexOutOfRange {
        hole: usize,
        start: usize,
        vertices: usize,
    },

    #[error("hole #{hole} starts at vertex {start}, before the previous hole at {previous}")]
    HoleIndicesNotAscending {
        hole: usize,
        start: usize,
        previous: usize,
    },

    #[error("{vertices} vertices don't fit in the index type (largest index {max})")]
    TooManyVertices { vertices: usize, max: usize },

    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
}
