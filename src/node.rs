//! Vertex arena shared by every stage of the triangulator.
//!
//! Rings are circular doubly linked lists threaded through one `Vec`; nodes refer to each
//! other by [`NodeIndex`]. Slot 0 holds a placeholder so that indices can be `NonZeroU32`.

use alloc::vec::Vec;
use core::num::NonZeroU32;
use core::ops::{Index, IndexMut};
use num_traits::float::Float;

pub(crate) type NodeIndex = NonZeroU32;

#[derive(Clone, Copy)]
pub(crate) struct Node<T: Float> {
    /// vertex index in the input
    pub(crate) i: u32,
    /// z-order curve value, computed once when the ring is indexed
    pub(crate) z: Option<i32>,
    pub(crate) x: T,
    pub(crate) y: T,
    pub(crate) prev_i: NodeIndex,
    pub(crate) next_i: NodeIndex,
    pub(crate) prev_z_i: Option<NodeIndex>,
    pub(crate) next_z_i: Option<NodeIndex>,
    /// collapsed single-point hole; never filtered away
    pub(crate) steiner: bool,
}

impl<T: Float> Node<T> {
    /// A one-node ring sitting in slot `at`.
    pub(crate) fn new(i: u32, x: T, y: T, at: NodeIndex) -> Self {
        Self {
            i,
            z: None,
            x,
            y,
            prev_i: at,
            next_i: at,
            prev_z_i: None,
            next_z_i: None,
            steiner: false,
        }
    }

    pub(crate) fn xy(&self) -> [T; 2] {
        [self.x, self.y]
    }
}

/// Owner of every node created during one triangulation.
pub(crate) struct Arena<T: Float> {
    nodes: Vec<Node<T>>,
}

impl<T: Float> Arena<T> {
    pub(crate) fn new() -> Self {
        let mut arena = Self { nodes: Vec::new() };
        arena.reset(0);
        arena
    }

    /// Forgets every ring and reserves room for `capacity` nodes.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.nodes.clear();
        self.nodes.reserve(capacity + 1);
        self.nodes.push(Node::new(
            0,
            T::infinity(),
            T::infinity(),
            NodeIndex::MIN,
        ));
    }

    /// Index the next pushed node will get.
    fn next_slot(&self) -> NodeIndex {
        // slot 0 is always taken, so this is the current length
        NodeIndex::MIN.saturating_add(self.nodes.len() as u32 - 1)
    }

    fn push(&mut self, i: u32, x: T, y: T) -> NodeIndex {
        let at = self.next_slot();
        self.nodes.push(Node::new(i, x, y, at));
        at
    }

    /// Makes `b` follow `a` in their ring.
    fn link(&mut self, a_i: NodeIndex, b_i: NodeIndex) {
        self[a_i].next_i = b_i;
        self[b_i].prev_i = a_i;
    }

    /// Adds a vertex right after `after`, or as a ring of its own.
    pub(crate) fn insert(&mut self, i: u32, x: T, y: T, after: Option<NodeIndex>) -> NodeIndex {
        let p_i = self.push(i, x, y);
        if let Some(after_i) = after {
            let next_i = self[after_i].next_i;
            self.link(after_i, p_i);
            self.link(p_i, next_i);
        }
        p_i
    }

    /// Unlinks `p_i` from its ring and from the z-order list.
    ///
    /// Returns the former `(prev, next)` ring neighbours, now adjacent.
    pub(crate) fn remove(&mut self, p_i: NodeIndex) -> (NodeIndex, NodeIndex) {
        let Node {
            prev_i,
            next_i,
            prev_z_i,
            next_z_i,
            ..
        } = self[p_i];
        self.link(prev_i, next_i);
        if let Some(z_i) = prev_z_i {
            self[z_i].next_z_i = next_z_i;
        }
        if let Some(z_i) = next_z_i {
            self[z_i].prev_z_i = prev_z_i;
        }
        (prev_i, next_i)
    }

    /// Connects `a_i` and `b_i` with a two-way bridge through copies of both.
    ///
    /// Two nodes on one ring split it in two, with `a_i` on one side and the returned copy of
    /// `b_i` on the other. Nodes on different rings (outer ring and a hole) merge them.
    pub(crate) fn split(&mut self, a_i: NodeIndex, b_i: NodeIndex) -> NodeIndex {
        let a = self[a_i];
        let b = self[b_i];
        let a2_i = self.push(a.i, a.x, a.y);
        let b2_i = self.push(b.i, b.x, b.y);

        self.link(a_i, b_i);
        self.link(b.prev_i, b2_i);
        self.link(b2_i, a2_i);
        self.link(a2_i, a.next_i);
        b2_i
    }

    /// The node with its ring neighbours, as `[prev, node, next]`.
    pub(crate) fn corner(&self, i: NodeIndex) -> [&Node<T>; 3] {
        let node = &self[i];
        [&self[node.prev_i], node, &self[node.next_i]]
    }

    /// Every node on the ring of `start_i`, beginning with it.
    pub(crate) fn ring(&self, start_i: NodeIndex) -> Walk<'_, T> {
        Walk {
            arena: self,
            next: Some(start_i),
            stop: start_i,
        }
    }

    /// Nodes from `from_i` forward, stopping before `until_i`.
    pub(crate) fn span(&self, from_i: NodeIndex, until_i: NodeIndex) -> Walk<'_, T> {
        Walk {
            arena: self,
            next: (from_i != until_i).then_some(from_i),
            stop: until_i,
        }
    }

    /// Ring edges `(p, p.next)` starting at `start_i`.
    pub(crate) fn edges(
        &self,
        start_i: NodeIndex,
    ) -> impl Iterator<Item = (&Node<T>, &Node<T>)> + '_ {
        self.ring(start_i).map(move |(_, p)| (p, &self[p.next_i]))
    }
}

impl<T: Float> Index<NodeIndex> for Arena<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, i: NodeIndex) -> &Node<T> {
        debug_assert!((i.get() as usize) < self.nodes.len());
        // indices only come from `push`, and the arena never shrinks while they're in use
        unsafe { self.nodes.get_unchecked(i.get() as usize) }
    }
}

impl<T: Float> IndexMut<NodeIndex> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, i: NodeIndex) -> &mut Node<T> {
        debug_assert!((i.get() as usize) < self.nodes.len());
        unsafe { self.nodes.get_unchecked_mut(i.get() as usize) }
    }
}

/// Iterator over ring nodes, following `next_i`.
pub(crate) struct Walk<'a, T: Float> {
    arena: &'a Arena<T>,
    next: Option<NodeIndex>,
    stop: NodeIndex,
}

impl<'a, T: Float> Iterator for Walk<'a, T> {
    type Item = (NodeIndex, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.next?;
        let arena = self.arena;
        let node = &arena[i];
        self.next = Some(node.next_i).filter(|&n| n != self.stop);
        Some((i, node))
    }
}

#[cfg(test)]
impl Arena<f64> {
    /// Builds one ring from `points` in order; returns it with its first node.
    pub(crate) fn from_points(points: &[[f64; 2]]) -> (Self, NodeIndex) {
        let mut arena = Self::new();
        let first = arena.push_ring(0, points);
        (arena, first)
    }

    /// Appends another ring whose vertex indices start at `first_index`.
    pub(crate) fn push_ring(&mut self, first_index: u32, points: &[[f64; 2]]) -> NodeIndex {
        let mut last = None;
        for (i, &[x, y]) in points.iter().enumerate() {
            last = Some(self.insert(first_index + i as u32, x, y, last));
        }
        let last = last.expect("at least one point");
        self[last].next_i
    }

    pub(crate) fn ring_len(&self, start_i: NodeIndex) -> usize {
        self.ring(start_i).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn ring_indices(arena: &Arena<f64>, start_i: NodeIndex) -> Vec<u32> {
        arena.ring(start_i).map(|(_, n)| n.i).collect()
    }

    #[test]
    fn test_insert_links_ring_in_order() {
        let (arena, first) = Arena::from_points(&[[0., 0.], [1., 0.], [1., 1.]]);
        assert_eq!(ring_indices(&arena, first), [0, 1, 2]);
        let [prev, node, next] = arena.corner(first);
        assert_eq!((prev.i, node.i, next.i), (2, 0, 1));
    }

    #[test]
    fn test_remove_keeps_ring_consistent() {
        let (mut arena, first) =
            Arena::from_points(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        let second = arena[first].next_i;
        let (prev_i, next_i) = arena.remove(second);
        assert_eq!(prev_i, first);
        assert_eq!(arena[prev_i].next_i, next_i);
        assert_eq!(arena[next_i].prev_i, prev_i);
        assert_eq!(ring_indices(&arena, first), [0, 2, 3]);
    }

    #[test]
    fn test_remove_unlinks_z_order() {
        let (mut arena, first) = Arena::from_points(&[[0., 0.], [1., 0.], [1., 1.]]);
        let second = arena[first].next_i;
        let third = arena[second].next_i;
        arena[first].next_z_i = Some(second);
        arena[second].prev_z_i = Some(first);
        arena[second].next_z_i = Some(third);
        arena[third].prev_z_i = Some(second);

        arena.remove(second);
        assert_eq!(arena[first].next_z_i, Some(third));
        assert_eq!(arena[third].prev_z_i, Some(first));
    }

    #[test]
    fn test_split_makes_two_rings() {
        let (mut arena, first) = Arena::from_points(&[
            [0., 0.],
            [2., 0.],
            [3., 1.],
            [2., 2.],
            [0., 2.],
            [-1., 1.],
        ]);
        let opposite = arena.ring(first).nth(3).map(|(i, _)| i).unwrap();
        let other = arena.split(first, opposite);
        // copies carry the vertex index of their originals
        assert_eq!(ring_indices(&arena, first), [0, 3, 4, 5]);
        assert_eq!(ring_indices(&arena, other), [3, 0, 1, 2]);
    }

    #[test]
    fn test_span_stops_before_end() {
        let (arena, first) = Arena::from_points(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        let third = arena.ring(first).nth(2).map(|(i, _)| i).unwrap();
        let visited: Vec<u32> = arena.span(first, third).map(|(_, n)| n.i).collect();
        assert_eq!(visited, [0, 1]);
        assert_eq!(arena.span(first, first).count(), 0);
    }

    #[test]
    fn test_edges_close_the_ring() {
        let (arena, first) = Arena::from_points(&[[0., 0.], [1., 0.], [1., 1.]]);
        let edges: Vec<(u32, u32)> = arena.edges(first).map(|(p, q)| (p.i, q.i)).collect();
        assert_eq!(edges, [(0, 1), (1, 2), (2, 0)]);
    }
}
