use core::cmp::Ordering;
use num_traits::float::Float;

use crate::filter::filter_cut;
use crate::geom::{locally_inside, point_in_triangle, sector_contains_sector};
use crate::node::{Arena, Node, NodeIndex};

/// Links every queued hole into the outer ring, left to right.
///
/// `queue` holds the leftmost node of each hole ring and is sorted in place.
pub(crate) fn eliminate_holes<T: Float>(
    arena: &mut Arena<T>,
    queue: &mut [NodeIndex],
    outer_i: NodeIndex,
) -> NodeIndex {
    // stable, so holes sharing a leftmost x keep their input order
    queue.sort_by(|&a, &b| {
        arena[a]
            .x
            .partial_cmp(&arena[b].x)
            .unwrap_or(Ordering::Equal)
    });
    queue
        .iter()
        .fold(outer_i, |outer_i, &hole_i| eliminate_hole(arena, hole_i, outer_i))
}

/// The node with the smallest x; on ties, the first one met walking from `start_i`.
pub(crate) fn get_leftmost<T: Float>(arena: &Arena<T>, start_i: NodeIndex) -> NodeIndex {
    arena
        .ring(start_i)
        .reduce(|best, cur| if cur.1.x < best.1.x { cur } else { best })
        .map_or(start_i, |(i, _)| i)
}

/// Splices one hole into the ring of `outer_i`; returns a node of the merged ring.
fn eliminate_hole<T: Float>(
    arena: &mut Arena<T>,
    hole_i: NodeIndex,
    outer_i: NodeIndex,
) -> NodeIndex {
    let Some(bridge_i) = find_hole_bridge(arena, hole_i, outer_i) else {
        let hole = &arena[hole_i];
        log::debug!(
            "no bridge found for hole at vertex {} ({:?}, {:?}); hole skipped",
            hole.i,
            hole.x.to_f64(),
            hole.y.to_f64()
        );
        return outer_i;
    };
    let bridge_reverse_i = arena.split(bridge_i, hole_i);
    filter_cut(arena, bridge_reverse_i);
    filter_cut(arena, bridge_i)
}

/// Where a ray cast from a hole towards -x first meets the outer ring.
enum RayHit<T> {
    /// the hole vertex lies on the outer edge; bridge straight to its left endpoint
    Touch(NodeIndex),
    /// the ray crosses an edge at `x`; `endpoint` is that edge's end with the smaller x
    Cross { x: T, endpoint: NodeIndex },
}

fn cast_ray_left<T: Float>(arena: &Arena<T>, hole: &Node<T>, outer_i: NodeIndex) -> Option<RayHit<T>> {
    let mut hit: Option<(T, NodeIndex)> = None;
    for (p_i, p) in arena.ring(outer_i) {
        let next = &arena[p.next_i];
        // edges running downwards across the hole's y
        if !(hole.y <= p.y && hole.y >= next.y && next.y != p.y) {
            continue;
        }
        let x = p.x + (hole.y - p.y) * (next.x - p.x) / (next.y - p.y);
        if !(x <= hole.x && hit.map_or(true, |(qx, _)| x > qx)) {
            continue;
        }
        let endpoint = if p.x < next.x { p_i } else { p.next_i };
        if x == hole.x {
            return Some(RayHit::Touch(endpoint));
        }
        hit = Some((x, endpoint));
    }
    hit.map(|(x, endpoint)| RayHit::Cross { x, endpoint })
}

/// David Eberly's algorithm for finding a bridge between hole and outer polygon
fn find_hole_bridge<T: Float>(
    arena: &Arena<T>,
    hole_i: NodeIndex,
    outer_i: NodeIndex,
) -> Option<NodeIndex> {
    let hole = &arena[hole_i];
    let (qx, m_i) = match cast_ray_left(arena, hole, outer_i)? {
        RayHit::Touch(m_i) => return Some(m_i),
        RayHit::Cross { x, endpoint } => (x, endpoint),
    };

    // Vertices inside the triangle (hole, ray hit, m) would block the bridge to m. Among
    // them, the one with the smallest angle to the ray is visible instead.
    let [mx, my] = arena[m_i].xy();
    let (a, c) = if hole.y < my {
        ([hole.x, hole.y], [qx, hole.y])
    } else {
        ([qx, hole.y], [hole.x, hole.y])
    };
    let in_range = |p: &Node<T>| hole.x >= p.x && p.x >= mx && hole.x != p.x;

    let mut best_i = m_i;
    let mut best_tan = T::infinity();
    for (p_i, p) in arena.ring(m_i) {
        if !in_range(p) || !point_in_triangle(a, [mx, my], c, p.xy()) {
            continue;
        }
        let tan = (hole.y - p.y).abs() / (hole.x - p.x);
        let best = &arena[best_i];
        let closer = tan < best_tan
            || (tan == best_tan
                && (p.x > best.x || (p.x == best.x && sector_contains_sector(arena, best_i, p_i))));
        if closer && locally_inside(arena, p_i, hole_i) {
            best_i = p_i;
            best_tan = tan;
        }
    }
    Some(best_i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftmost_takes_first_of_ties() {
        let (arena, first) = Arena::from_points(&[[5., 5.], [0., 7.], [0., 3.], [4., 0.]]);
        assert_eq!(arena[get_leftmost(&arena, first)].i, 1);
        // starting the walk past vertex 1 finds vertex 2 first
        let third = arena.ring(first).nth(2).map(|(i, _)| i).unwrap();
        assert_eq!(arena[get_leftmost(&arena, third)].i, 2);
    }

    #[test]
    fn test_bridge_merges_hole_into_outer() {
        // outer counter-clockwise, hole clockwise
        let (mut arena, outer) =
            Arena::from_points(&[[0., 0.], [10., 0.], [10., 10.], [0., 10.]]);
        let hole = arena.push_ring(4, &[[3., 3.], [3., 7.], [7., 7.], [7., 3.]]);
        let leftmost = get_leftmost(&arena, hole);
        assert_eq!(arena[leftmost].i, 4);

        let bridge = find_hole_bridge(&arena, leftmost, outer).unwrap();
        assert_eq!(arena[bridge].i, 0);

        let mut queue = [leftmost];
        let merged = eliminate_holes(&mut arena, &mut queue, outer);
        assert_eq!(arena.ring_len(merged), 4 + 4 + 2);
    }

    #[test]
    fn test_bridge_to_touching_edge() {
        let (mut arena, outer) =
            Arena::from_points(&[[0., 0.], [10., 0.], [10., 10.], [0., 10.]]);
        // the hole's leftmost vertex sits on the left edge at (0, 5)
        let hole = arena.push_ring(4, &[[0., 5.], [4., 8.], [4., 2.]]);
        let bridge = find_hole_bridge(&arena, hole, outer).unwrap();
        assert_eq!(arena[bridge].xy(), [0., 0.]);
    }

    #[test]
    fn test_hole_without_bridge_is_skipped() {
        let (mut arena, outer) =
            Arena::from_points(&[[0., 0.], [10., 0.], [10., 10.], [0., 10.]]);
        let hole = arena.push_ring(4, &[[-20., 3.], [-20., 7.], [-15., 7.], [-15., 3.]]);
        let mut queue = [get_leftmost(&arena, hole)];
        let merged = eliminate_holes(&mut arena, &mut queue, outer);
        assert_eq!(merged, outer);
        assert_eq!(arena.ring_len(merged), 4);
    }

    #[test]
    fn test_holes_bridge_left_to_right() {
        let (mut arena, outer) =
            Arena::from_points(&[[0., 0.], [20., 0.], [20., 10.], [0., 10.]]);
        let right = arena.push_ring(4, &[[12., 3.], [12., 7.], [18., 7.], [18., 3.]]);
        let left = arena.push_ring(8, &[[2., 2.], [2., 8.], [8., 8.], [8., 2.]]);
        let mut queue = [get_leftmost(&arena, right), get_leftmost(&arena, left)];
        let merged = eliminate_holes(&mut arena, &mut queue, outer);
        assert_eq!(arena[queue[0]].i, 8);
        assert_eq!(arena.ring_len(merged), 4 + 4 + 4 + 2 * 2);
    }
}
