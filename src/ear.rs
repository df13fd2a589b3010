//! The ear slicing loop and its fallback passes.

use alloc::vec::Vec;
use core::iter::successors;
use num_traits::float::Float;

use crate::filter::{filter_cut, filter_points};
use crate::geom::{area, equals, intersects, is_valid_diagonal, locally_inside, point_in_triangle};
use crate::node::{Arena, NodeIndex};
use crate::zorder::{index_curve, ZGrid};
use crate::Index;

/// Escalation level of [`earcut_linked`] once a full revolution finds no ear.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Pass {
    /// plain ear slicing
    Initial,
    /// retried after removing collinear and duplicate points
    Cleaned,
    /// retried after curing local self-intersections; next stop is splitting
    Cured,
}

impl Pass {
    /// Reworks a ring that has no ear left and slices it again one level up.
    fn escalate<T: Float, N: Index>(
        self,
        arena: &mut Arena<T>,
        ear_i: NodeIndex,
        triangles: &mut Vec<N>,
        grid: Option<&ZGrid<T>>,
    ) {
        log::debug!("no ear found during {:?} pass", self);
        match self {
            Pass::Initial => {
                let ear_i = filter_points(arena, ear_i, None);
                earcut_linked(arena, ear_i, triangles, grid, Pass::Cleaned);
            }
            Pass::Cleaned => {
                let ear_i = filter_points(arena, ear_i, None);
                let ear_i = cure_local_intersections(arena, ear_i, triangles);
                earcut_linked(arena, ear_i, triangles, grid, Pass::Cured);
            }
            Pass::Cured => split_earcut(arena, ear_i, triangles, grid),
        }
    }
}

/// Slices ears off the ring of `ear_i` until a single node is left, escalating through
/// [`Pass`] whenever a full revolution finds none.
pub(crate) fn earcut_linked<T: Float, N: Index>(
    arena: &mut Arena<T>,
    mut ear_i: NodeIndex,
    triangles: &mut Vec<N>,
    grid: Option<&ZGrid<T>>,
    pass: Pass,
) {
    if let (Pass::Initial, Some(grid)) = (pass, grid) {
        index_curve(arena, ear_i, grid);
    }

    let mut stop_i = ear_i;
    loop {
        let ear = &arena[ear_i];
        if ear.prev_i == ear.next_i {
            return;
        }
        let next_i = ear.next_i;

        let clip = match grid {
            Some(grid) => is_ear_hashed(arena, ear_i, grid),
            None => is_ear(arena, ear_i),
        };
        if !clip {
            ear_i = next_i;
            if ear_i == stop_i {
                return pass.escalate(arena, ear_i, triangles, grid);
            }
            continue;
        }

        triangles.extend(arena.corner(ear_i).map(|n| N::from_usize(n.i as usize)));
        arena.remove(ear_i);
        // continuing two steps ahead leaves fewer sliver triangles
        ear_i = arena[next_i].next_i;
        stop_i = ear_i;
    }
}

/// The triangle a corner would cut off, with its bounding box.
struct Candidate<T> {
    prev_i: NodeIndex,
    next_i: NodeIndex,
    corners: [[T; 2]; 3],
    min: [T; 2],
    max: [T; 2],
}

impl<T: Float> Candidate<T> {
    /// `None` for reflex and flat corners, which are never ears.
    fn at(arena: &Arena<T>, ear_i: NodeIndex) -> Option<Self> {
        let [a, b, c] = arena.corner(ear_i);
        if area(a, b, c) >= T::zero() {
            return None;
        }
        let lo = |u: T, v: T, w: T| u.min(v).min(w);
        let hi = |u: T, v: T, w: T| u.max(v).max(w);
        Some(Self {
            prev_i: b.prev_i,
            next_i: b.next_i,
            corners: [a.xy(), b.xy(), c.xy()],
            min: [lo(a.x, b.x, c.x), lo(a.y, b.y, c.y)],
            max: [hi(a.x, b.x, c.x), hi(a.y, b.y, c.y)],
        })
    }

    /// Whether node `p_i` sits inside the triangle at a reflex or flat corner, which would
    /// leave part of the ring overlapping the clipped ear.
    fn blocked_by(&self, arena: &Arena<T>, p_i: NodeIndex) -> bool {
        if p_i == self.prev_i || p_i == self.next_i {
            return false;
        }
        let [prev, p, next] = arena.corner(p_i);
        let [x, y] = p.xy();
        let [a, b, c] = self.corners;
        (x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1])
            && point_in_triangle(a, b, c, [x, y])
            && area(prev, p, next) >= T::zero()
    }
}

/// check whether a polygon node forms a valid ear with adjacent nodes
fn is_ear<T: Float>(arena: &Arena<T>, ear_i: NodeIndex) -> bool {
    let Some(ear) = Candidate::at(arena, ear_i) else {
        return false;
    };
    let after_i = arena[ear.next_i].next_i;
    !arena
        .span(after_i, ear.prev_i)
        .any(|(p_i, _)| ear.blocked_by(arena, p_i))
}

/// Same as [`is_ear`], but only visits nodes whose z-order falls in the triangle's bbox.
fn is_ear_hashed<T: Float>(arena: &Arena<T>, ear_i: NodeIndex, grid: &ZGrid<T>) -> bool {
    let Some(ear) = Candidate::at(arena, ear_i) else {
        return false;
    };
    let min_z = Some(grid.z_order(ear.min[0], ear.min[1]));
    let max_z = Some(grid.z_order(ear.max[0], ear.max[1]));

    let node = &arena[ear_i];
    let below = successors(node.prev_z_i, |&i| arena[i].prev_z_i).take_while(|&i| arena[i].z >= min_z);
    let above = successors(node.next_z_i, |&i| arena[i].next_z_i).take_while(|&i| arena[i].z <= max_z);
    !below.chain(above).any(|p_i| ear.blocked_by(arena, p_i))
}

/// Replaces each pair of crossing edges `a p` and `p_next b` with the triangle `a p b`.
///
/// Returns a node of what is left of the ring, filtered.
fn cure_local_intersections<T: Float, N: Index>(
    arena: &mut Arena<T>,
    mut start_i: NodeIndex,
    triangles: &mut Vec<N>,
) -> NodeIndex {
    let mut p_i = start_i;
    loop {
        let [a, p, p_next] = arena.corner(p_i);
        let (a_i, p_next_i, b_i) = (p.prev_i, p.next_i, p_next.next_i);
        let b = &arena[b_i];

        let crossing = !equals(a, b)
            && intersects(a, p, p_next, b)
            && locally_inside(arena, a_i, b_i)
            && locally_inside(arena, b_i, a_i);
        if crossing {
            triangles.extend([a.i, p.i, b.i].map(|i| N::from_usize(i as usize)));
            arena.remove(p_i);
            arena.remove(p_next_i);
            p_i = b_i;
            start_i = b_i;
        }

        p_i = arena[p_i].next_i;
        if p_i == start_i {
            return filter_points(arena, p_i, None);
        }
    }
}

/// First valid diagonal `(a, b)` of the ring, walking `a` from `start_i`.
fn find_diagonal<T: Float>(arena: &Arena<T>, start_i: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
    arena.ring(start_i).find_map(|(a_i, a)| {
        let from_i = arena[a.next_i].next_i;
        arena
            .span(from_i, a.prev_i)
            .find(|&(b_i, b)| a.i != b.i && is_valid_diagonal(arena, a_i, b_i))
            .map(|(b_i, _)| (a_i, b_i))
    })
}

/// Splits the ring along a valid diagonal and slices both halves from scratch.
fn split_earcut<T: Float, N: Index>(
    arena: &mut Arena<T>,
    start_i: NodeIndex,
    triangles: &mut Vec<N>,
    grid: Option<&ZGrid<T>>,
) {
    let Some((a_i, b_i)) = find_diagonal(arena, start_i) else {
        log::debug!(
            "no valid diagonal in the ring at vertex {}; leaving it untriangulated",
            arena[start_i].i
        );
        return;
    };
    let c_i = arena.split(a_i, b_i);
    let a_i = filter_cut(arena, a_i);
    let c_i = filter_cut(arena, c_i);
    earcut_linked(arena, a_i, triangles, grid, Pass::Initial);
    earcut_linked(arena, c_i, triangles, grid, Pass::Initial);
}
