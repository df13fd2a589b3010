//! Helpers for preparing input and checking results.

use alloc::vec::Vec;
use num_traits::float::Float;

use crate::geom::signed_area;
use crate::{ring_bounds, Index};

/// Returns a percentage difference between the polygon area and its triangulation area;
/// used to verify correctness of triangulation
///
/// Takes the same flat `coordinates`, `hole_indices` and `dim` as [`crate::triangulate`].
/// A triangle referring to a vertex that doesn't exist makes the result infinite.
pub fn deviation<T: Float, N: Index>(
    coordinates: &[T],
    hole_indices: &[N],
    dim: usize,
    triangles: &[N],
) -> T {
    if dim < 2 {
        return T::zero();
    }
    let data: Vec<[T; 2]> = coordinates
        .chunks_exact(dim)
        .map(|v| [v[0], v[1]])
        .collect();

    let polygon_area = if data.len() < 3 {
        T::zero()
    } else {
        let mut rings = ring_bounds(hole_indices, data.len());
        let (start, end) = rings.next().unwrap_or((0, 0));
        let mut polygon_area = if end - start >= 3 {
            signed_area(&data, start, end).abs()
        } else {
            T::zero()
        };
        for (start, end) in rings {
            if end - start >= 3 {
                polygon_area = polygon_area - signed_area(&data, start, end).abs();
            }
        }
        polygon_area
    };

    let mut triangles_area = T::zero();
    for t in triangles.chunks_exact(3) {
        let corners = [t[0], t[1], t[2]].map(|i| data.get(i.into_usize()).copied());
        let [Some(a), Some(b), Some(c)] = corners else {
            return T::infinity();
        };
        triangles_area = triangles_area
            + ((a[0] - c[0]) * (b[1] - a[1]) - (a[0] - b[0]) * (c[1] - a[1])).abs();
    }
    if polygon_area == T::zero() && triangles_area == T::zero() {
        T::zero()
    } else {
        ((polygon_area - triangles_area) / polygon_area).abs()
    }
}

/// Turns nested rings (outer ring first, then holes, each a list of vertices) into the
/// flat `(coordinates, hole_indices, dim)` form accepted by [`crate::triangulate`].
///
/// The dimension is taken from the first vertex of the outer ring.
pub fn flatten<T: Copy>(rings: &[Vec<Vec<T>>]) -> (Vec<T>, Vec<usize>, usize) {
    let dim = rings
        .first()
        .and_then(|outer| outer.first())
        .map_or(0, |v| v.len());
    let coordinates = rings.iter().flatten().flatten().copied().collect();
    let hole_indices = rings
        .iter()
        .take(rings.len().saturating_sub(1))
        .scan(0, |start, ring| {
            *start += ring.len();
            Some(*start)
        })
        .collect();
    (coordinates, hole_indices, dim)
}
