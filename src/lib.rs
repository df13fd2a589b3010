//! Ear-clipping polygon triangulation.
//!
//! Polygons are given as a flat coordinate array, optionally followed by holes. Holes are
//! bridged into the outer ring, large rings get a z-order index to speed up ear checks, and
//! rings that can't be sliced cleanly go through escalating fallback passes (filtering,
//! curing local self-intersections, splitting). Degenerate input never panics or errors;
//! it produces fewer triangles.
//!
//! ```
//! let square = [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
//! let triangles: Vec<u32> = earclip::triangulate(&square, &[], 2);
//! assert_eq!(triangles, vec![2, 3, 0, 0, 1, 2]);
//! ```

#![no_std]

extern crate alloc;

mod node;
mod deviation;
mod ear;
mod error;
mod filter;
mod geom;
mod holes;
mod zorder;

pub use deviation::{deviation, flatten};
pub use error::{Error, Result};

use alloc::vec::Vec;
use num_traits::float::Float;

use ear::{earcut_linked, Pass};
use filter::filter_points;
use geom::{equals, signed_area};
use holes::{eliminate_holes, get_leftmost};
use node::{Arena, NodeIndex};
use zorder::ZGrid;

/// Polygons with more vertices than this are indexed along a z-order curve.
const HASH_THRESHOLD: usize = 80;

/// Integer type of the output vertex indices
pub trait Index: Copy {
    /// Largest vertex index the type can hold.
    const MAX: usize;
    fn into_usize(self) -> usize;
    fn from_usize(v: usize) -> Self;
}

macro_rules! impl_index {
    ($($t:ty),*) => {$(
        impl Index for $t {
            const MAX: usize = <$t>::MAX as usize;

            #[inline]
            fn into_usize(self) -> usize {
                self as usize
            }

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v <= <Self as Index>::MAX,
                    "vertex index {} doesn't fit in {}",
                    v,
                    stringify!($t)
                );
                v as $t
            }
        }
    )*};
}

impl_index!(u16, u32, usize);

/// `(start, end)` vertex ranges of the outer ring followed by every hole, clamped to `len`.
pub(crate) fn ring_bounds<N: Index>(
    hole_indices: &[N],
    len: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    let starts = core::iter::once(0).chain(hole_indices.iter().map(|h| h.into_usize()));
    let ends = hole_indices
        .iter()
        .map(|h| h.into_usize())
        .chain(core::iter::once(len));
    starts.zip(ends).map(move |(start, end)| {
        let start = start.min(len);
        (start, end.clamp(start, len))
    })
}

/// Triangulates a polygon given as flat coordinates.
///
/// `hole_indices` holds the vertex index (not the coordinate offset) at which each hole
/// starts, in ascending order. `dim` is the number of coordinates per vertex; only the
/// first two are used. Returns vertex indices, three per triangle.
///
/// This entry point doesn't validate its input; see [`try_triangulate`].
pub fn triangulate<T: Float, N: Index>(coordinates: &[T], hole_indices: &[N], dim: usize) -> Vec<N> {
    let mut triangles = Vec::new();
    Earcut::new().earcut(coordinates, hole_indices, dim, &mut triangles);
    triangles
}

/// Same as [`triangulate`], but rejects structurally invalid input instead of guessing.
pub fn try_triangulate<T: Float, N: Index>(
    coordinates: &[T],
    hole_indices: &[N],
    dim: usize,
) -> Result<Vec<N>> {
    let mut triangles = Vec::new();
    Earcut::new().try_earcut(coordinates, hole_indices, dim, &mut triangles)?;
    Ok(triangles)
}

fn validate<T: Float, N: Index>(coordinates: &[T], hole_indices: &[N], dim: usize) -> Result<()> {
    if dim < 2 {
        return Err(Error::InvalidDimension(dim));
    }
    if coordinates.len() % dim != 0 {
        return Err(Error::RaggedCoordinates {
            len: coordinates.len(),
            dim,
        });
    }
    let vertices = coordinates.len() / dim;
    // node indices are u32 internally
    let max = N::MAX.min(u32::MAX as usize);
    if vertices > 0 && vertices - 1 > max {
        return Err(Error::TooManyVertices { vertices, max });
    }
    let mut previous = 0;
    for (hole, start) in hole_indices.iter().map(|h| h.into_usize()).enumerate() {
        if start > vertices {
            return Err(Error::HoleIndexOutOfRange {
                hole,
                start,
                vertices,
            });
        }
        if start < previous {
            return Err(Error::HoleIndicesNotAscending {
                hole,
                start,
                previous,
            });
        }
        previous = start;
    }
    if let Some(vertex) = coordinates
        .chunks_exact(dim)
        .position(|v| !v[0].is_finite() || !v[1].is_finite())
    {
        return Err(Error::NonFiniteCoordinate(vertex));
    }
    Ok(())
}

/// Instance of the earcut algorithm.
pub struct Earcut<T: Float> {
    data: Vec<[T; 2]>,
    nodes: Arena<T>,
    queue: Vec<NodeIndex>,
}

impl<T: Float> Default for Earcut<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Earcut<T> {
    /// Creates a new instance of the earcut algorithm.
    ///
    /// You can reuse a single instance for multiple triangulations to reduce memory allocations.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nodes: Arena::new(),
            queue: Vec::new(),
        }
    }

    fn reset(&mut self, capacity: usize) {
        self.nodes.reset(capacity);
        self.queue.clear();
    }

    /// Performs the earcut triangulation on a polygon given as flat coordinates.
    ///
    /// The arguments mirror [`triangulate`]; the resulting indices replace the contents of
    /// `triangles_out`.
    pub fn earcut<N: Index>(
        &mut self,
        coordinates: &[T],
        hole_indices: &[N],
        dim: usize,
        triangles_out: &mut Vec<N>,
    ) {
        triangles_out.clear();
        if dim < 2 {
            log::debug!("dimension {} is too small to triangulate", dim);
            return;
        }
        self.data.clear();
        self.data
            .extend(coordinates.chunks_exact(dim).map(|v| [v[0], v[1]]));
        self.triangulate_data(hole_indices, triangles_out);
    }

    /// Performs the earcut triangulation on a polygon given as `[x, y]` points.
    ///
    /// `hole_indices` and the resulting indices refer to positions in `points`.
    pub fn earcut_points<N: Index>(
        &mut self,
        points: impl IntoIterator<Item = [T; 2]>,
        hole_indices: &[N],
        triangles_out: &mut Vec<N>,
    ) {
        triangles_out.clear();
        self.data.clear();
        self.data.extend(points);
        self.triangulate_data(hole_indices, triangles_out);
    }

    /// Validating variant of [`Earcut::earcut`].
    ///
    /// On error `triangles_out` is left empty.
    pub fn try_earcut<N: Index>(
        &mut self,
        coordinates: &[T],
        hole_indices: &[N],
        dim: usize,
        triangles_out: &mut Vec<N>,
    ) -> Result<()> {
        triangles_out.clear();
        validate(coordinates, hole_indices, dim)?;
        self.earcut(coordinates, hole_indices, dim, triangles_out);
        Ok(())
    }

    fn triangulate_data<N: Index>(&mut self, hole_indices: &[N], triangles_out: &mut Vec<N>) {
        if self.data.len() < 3 {
            return;
        }
        let use_index = self.data.len() > HASH_THRESHOLD;
        self.triangulate_rings(hole_indices, triangles_out, use_index);
    }

    fn triangulate_rings<N: Index>(
        &mut self,
        hole_indices: &[N],
        triangles_out: &mut Vec<N>,
        use_index: bool,
    ) {
        triangles_out.reserve(self.data.len() * 3);
        self.reset(self.data.len() * 3 / 2);

        let mut rings = ring_bounds(hole_indices, self.data.len());
        let Some((_, outer_len)) = rings.next() else {
            return;
        };

        // create nodes
        let Some(outer_node_i) = self.linked_list(0, outer_len, true) else {
            return;
        };
        let mut outer_node_i = filter_points(&mut self.nodes, outer_node_i, None);
        let outer_node = &self.nodes[outer_node_i];
        if outer_node.next_i == outer_node.prev_i {
            return;
        }

        for (start, end) in rings {
            if let Some(list_i) = self.linked_list(start, end, false) {
                let list = &mut self.nodes[list_i];
                list.steiner = list.next_i == list_i;
                self.queue.push(get_leftmost(&self.nodes, list_i));
            }
        }
        if !self.queue.is_empty() {
            outer_node_i = eliminate_holes(&mut self.nodes, &mut self.queue, outer_node_i);
        }

        // if the shape is not too simple, we'll use z-order curve hash later
        let grid = if use_index {
            ZGrid::from_points(&self.data[..outer_len])
        } else {
            None
        };
        log::trace!(
            "triangulating {} vertices, {} holes, z-order index: {}",
            self.data.len(),
            self.queue.len(),
            grid.is_some()
        );

        earcut_linked(
            &mut self.nodes,
            outer_node_i,
            triangles_out,
            grid.as_ref(),
            Pass::Initial,
        );
    }

    /// Links `data[start..end]` into a ring wound counter-clockwise for the outer ring
    /// (`outer`) and clockwise for holes. A closing vertex repeating the first is dropped.
    fn linked_list(&mut self, start: usize, end: usize, outer: bool) -> Option<NodeIndex> {
        if start >= end {
            return None;
        }
        let forward = outer == (signed_area(&self.data, start, end) > T::zero());
        let points = self.data[start..end].iter().enumerate().map(|(i, p)| (start + i, p));
        let mut last_i = None;
        let mut push = |(idx, &[x, y]): (usize, &[T; 2])| {
            last_i = Some(self.nodes.insert(idx as u32, x, y, last_i));
        };
        if forward {
            points.for_each(&mut push);
        } else {
            points.rev().for_each(&mut push);
        }

        let last_i = last_i?;
        let [_, last, first] = self.nodes.corner(last_i);
        if last.next_i != last_i && equals(last, first) {
            let (_, first_i) = self.nodes.remove(last_i);
            return Some(first_i);
        }
        Some(last_i)
    }
}
