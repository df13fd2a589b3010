//! Geometric predicates shared by the ring builder, the hole eliminator and the ear engine.

use core::cmp::Ordering;
use num_traits::float::Float;

use crate::node::{Arena, Node, NodeIndex};

/// Shoelace sum over `data[start..end]`; positive for counter-clockwise rings (y up).
pub(crate) fn signed_area<T: Float>(data: &[[T; 2]], start: usize, end: usize) -> T {
    let [mut bx, mut by] = data[end - 1];
    let mut sum = T::zero();
    for &[ax, ay] in &data[start..end] {
        sum = sum + (bx - ax) * (ay + by);
        (bx, by) = (ax, ay);
    }
    sum
}

/// Whether `p` lies inside or on the boundary of the counter-clockwise triangle `a, b, c`.
pub(crate) fn point_in_triangle<T: Float>(a: [T; 2], b: [T; 2], c: [T; 2], p: [T; 2]) -> bool {
    let [px, py] = p;
    // `p` is on the inner side of the edge from `to` back to `from`
    let inside = |[fx, fy]: [T; 2], [tx, ty]: [T; 2]| (tx - px) * (fy - py) >= (fx - px) * (ty - py);
    inside(a, c) && inside(b, a) && inside(c, b)
}

/// signed area of a triangle; negative when `p, q, r` turn counter-clockwise
pub(crate) fn area<T: Float>(p: &Node<T>, q: &Node<T>, r: &Node<T>) -> T {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

pub(crate) fn equals<T: Float>(p: &Node<T>, q: &Node<T>) -> bool {
    p.xy() == q.xy()
}

fn between<T: Float>(v: T, a: T, b: T) -> bool {
    v >= a.min(b) && v <= a.max(b)
}

/// for collinear points p, q, r, check if point q lies on segment pr
fn on_segment<T: Float>(p: &Node<T>, q: &Node<T>, r: &Node<T>) -> bool {
    between(q.x, p.x, r.x) && between(q.y, p.y, r.y)
}

fn orientation<T: Float>(p: &Node<T>, q: &Node<T>, r: &Node<T>) -> Ordering {
    area(p, q, r)
        .partial_cmp(&T::zero())
        .unwrap_or(Ordering::Equal)
}

/// Whether segments `p1 q1` and `p2 q2` share at least one point.
pub(crate) fn intersects<T: Float>(p1: &Node<T>, q1: &Node<T>, p2: &Node<T>, q2: &Node<T>) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);
    if o1 != o2 && o3 != o4 {
        return true;
    }
    // an endpoint collinear with, and lying on, the other segment
    (o1.is_eq() && on_segment(p1, p2, q1))
        || (o2.is_eq() && on_segment(p1, q2, q1))
        || (o3.is_eq() && on_segment(p2, p1, q2))
        || (o4.is_eq() && on_segment(p2, q1, q2))
}

/// Whether the diagonal `a b` crosses an edge of the ring that doesn't end in `a` or `b`.
pub(crate) fn intersects_polygon<T: Float>(arena: &Arena<T>, a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let (a, b) = (&arena[a_i], &arena[b_i]);
    let touches = |n: &Node<T>| n.i == a.i || n.i == b.i;
    arena
        .edges(a_i)
        .any(|(p, q)| !touches(p) && !touches(q) && intersects(p, q, a, b))
}

/// Even-odd test of the midpoint of `a b` against the ring.
pub(crate) fn middle_inside<T: Float>(arena: &Arena<T>, a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let (a, b) = (&arena[a_i], &arena[b_i]);
    let two = T::one() + T::one();
    let (mx, my) = ((a.x + b.x) / two, (a.y + b.y) / two);
    let crossings = arena
        .edges(a_i)
        .filter(|(p, q)| {
            (p.y > my) != (q.y > my)
                && q.y != p.y
                && mx < (q.x - p.x) * (my - p.y) / (q.y - p.y) + p.x
        })
        .count();
    crossings % 2 == 1
}

/// Whether the diagonal from `a` towards `b` starts into the interior at `a`.
pub(crate) fn locally_inside<T: Float>(arena: &Arena<T>, a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let [prev, a, next] = arena.corner(a_i);
    let b = &arena[b_i];
    let zero = T::zero();
    if area(prev, a, next) < zero {
        // convex corner: b must be between both edges
        area(a, b, next) >= zero && area(a, prev, b) >= zero
    } else {
        area(a, b, prev) < zero || area(a, next, b) < zero
    }
}

/// Whether `a b` can split the ring: it stays inside and crosses nothing.
pub(crate) fn is_valid_diagonal<T: Float>(arena: &Arena<T>, a_i: NodeIndex, b_i: NodeIndex) -> bool {
    let [a_prev, a, a_next] = arena.corner(a_i);
    let [b_prev, b, b_next] = arena.corner(b_i);
    let zero = T::zero();

    if a_next.i == b.i || a_prev.i == b.i || intersects_polygon(arena, a_i, b_i) {
        return false;
    }

    let visible = locally_inside(arena, a_i, b_i)
        && locally_inside(arena, b_i, a_i)
        && middle_inside(arena, a_i, b_i);
    let opposite_sectors = area(a_prev, a, b_prev) == zero && area(a, b_prev, b) == zero;
    if visible && !opposite_sectors {
        return true;
    }
    // two copies of one vertex, both at reflex corners
    equals(a, b) && area(a_prev, a, a_next) > zero && area(b_prev, b, b_next) > zero
}

/// Whether the sector at `m` contains the sector at `p`, both at the same coordinates.
pub(crate) fn sector_contains_sector<T: Float>(
    arena: &Arena<T>,
    m_i: NodeIndex,
    p_i: NodeIndex,
) -> bool {
    let [m_prev, m, m_next] = arena.corner(m_i);
    let [p_prev, _, p_next] = arena.corner(p_i);
    area(m_prev, m, p_prev) < T::zero() && area(p_next, m, m_next) < T::zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Node<f64> {
        Node::new(0, x, y, NodeIndex::MIN)
    }

    fn nth(arena: &Arena<f64>, first: NodeIndex, n: usize) -> NodeIndex {
        arena.ring(first).nth(n).map(|(i, _)| i).unwrap()
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [[0., 0.], [10., 0.], [10., 10.], [0., 10.]];
        assert_eq!(signed_area(&ccw, 0, 4), 200.);
        let cw = [[0., 0.], [0., 10.], [10., 10.], [10., 0.]];
        assert_eq!(signed_area(&cw, 0, 4), -200.);
    }

    #[test]
    fn test_triangle_area_sign() {
        // counter-clockwise turn is negative in this convention
        assert!(area(&pt(0., 0.), &pt(1., 0.), &pt(1., 1.)) < 0.);
        assert!(area(&pt(0., 0.), &pt(1., 1.), &pt(1., 0.)) > 0.);
        assert_eq!(area(&pt(0., 0.), &pt(1., 1.), &pt(2., 2.)), 0.);
    }

    #[test]
    fn test_point_in_triangle_includes_boundary() {
        let (a, b, c) = ([0., 0.], [10., 0.], [0., 10.]);
        assert!(point_in_triangle(a, b, c, [2., 2.]));
        assert!(point_in_triangle(a, b, c, [5., 0.]));
        assert!(point_in_triangle(a, b, c, [0., 0.]));
        assert!(!point_in_triangle(a, b, c, [6., 6.]));
        assert!(!point_in_triangle(a, b, c, [-1., 5.]));
    }

    #[test]
    fn test_intersects() {
        let (a, b) = (pt(0., 0.), pt(10., 10.));
        assert!(intersects(&a, &b, &pt(0., 10.), &pt(10., 0.)));
        assert!(!intersects(&a, &b, &pt(0., 1.), &pt(-5., 10.)));
        // collinear, touching end point
        assert!(intersects(&a, &b, &pt(10., 10.), &pt(20., 20.)));
        // collinear, disjoint
        assert!(!intersects(&a, &b, &pt(11., 11.), &pt(20., 20.)));
        // T junction
        assert!(intersects(&a, &b, &pt(5., 5.), &pt(10., 0.)));
    }

    #[test]
    fn test_on_segment_uses_both_bounds() {
        assert!(on_segment(&pt(0., 0.), &pt(5., 5.), &pt(10., 10.)));
        assert!(on_segment(&pt(10., 10.), &pt(5., 5.), &pt(0., 0.)));
        assert!(!on_segment(&pt(0., 0.), &pt(5., -1.), &pt(10., 10.)));
        assert!(!on_segment(&pt(0., 0.), &pt(5., 11.), &pt(10., 10.)));
    }

    #[test]
    fn test_middle_inside_concave() {
        // U shape opening upwards
        let (arena, first) = Arena::from_points(&[
            [0., 0.],
            [30., 0.],
            [30., 30.],
            [20., 30.],
            [20., 10.],
            [10., 10.],
            [10., 30.],
            [0., 30.],
        ]);
        let at = |n| nth(&arena, first, n);
        // across the notch: midpoint (15, 30) is outside
        assert!(!middle_inside(&arena, at(3), at(6)));
        // from the bottom-left corner: midpoint (10, 5) is inside
        assert!(middle_inside(&arena, at(0), at(4)));
        // the notch edge blocks the diagonal from the top-left to the top-right
        assert!(!is_valid_diagonal(&arena, at(7), at(2)));
        assert!(is_valid_diagonal(&arena, at(0), at(4)));
    }

    #[test]
    fn test_locally_inside_convex_corner() {
        let (arena, first) = Arena::from_points(&[[0., 0.], [10., 0.], [10., 10.], [0., 10.]]);
        let opposite = nth(&arena, first, 2);
        assert!(locally_inside(&arena, first, opposite));
        assert!(is_valid_diagonal(&arena, first, opposite));
        // neighbours are never diagonals
        assert!(!is_valid_diagonal(&arena, first, nth(&arena, first, 1)));
    }

    #[test]
    fn test_locally_inside_reflex_corner() {
        // arrow head with a reflex vertex at (5, 3)
        let (mut arena, first) =
            Arena::from_points(&[[0., 0.], [5., 3.], [10., 0.], [5., 10.]]);
        let below = arena.insert(9, 5., -5., None);
        let reflex = nth(&arena, first, 1);
        let tip = nth(&arena, first, 3);
        assert!(locally_inside(&arena, reflex, tip));
        // straight down from the reflex corner leaves the polygon
        assert!(!locally_inside(&arena, reflex, below));
    }
}
