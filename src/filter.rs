use num_traits::float::Float;

use crate::geom::{area, equals};
use crate::node::{Arena, NodeIndex};

/// Whether the node adds nothing to the ring's shape: it repeats its successor or sits on a
/// straight line between its neighbours. Steiner points always count.
fn is_redundant<T: Float>(arena: &Arena<T>, p_i: NodeIndex) -> bool {
    let [prev, p, next] = arena.corner(p_i);
    !p.steiner && (equals(p, next) || area(prev, p, next) == T::zero())
}

/// Removes duplicate and collinear nodes.
///
/// Scans from `start_i` until a full revolution up to `end_i` (defaults to `start_i`) goes by
/// without removals. When the ring collapses, the returned node is its own neighbour, which
/// the ear engine treats as nothing left to triangulate.
pub(crate) fn filter_points<T: Float>(
    arena: &mut Arena<T>,
    start_i: NodeIndex,
    end_i: Option<NodeIndex>,
) -> NodeIndex {
    let mut end_i = end_i.unwrap_or(start_i);
    let mut p_i = start_i;
    loop {
        if !is_redundant(arena, p_i) {
            p_i = arena[p_i].next_i;
            if p_i == end_i {
                return end_i;
            }
            continue;
        }
        let (prev_i, next_i) = arena.remove(p_i);
        if prev_i == next_i {
            return prev_i;
        }
        // the previous node may have turned redundant; restart the revolution from it
        p_i = prev_i;
        end_i = prev_i;
    }
}

/// Cleans up the few nodes around one end of a freshly cut bridge or diagonal.
pub(crate) fn filter_cut<T: Float>(arena: &mut Arena<T>, cut_i: NodeIndex) -> NodeIndex {
    let end_i = arena[cut_i].next_i;
    filter_points(arena, cut_i, Some(end_i))
}
