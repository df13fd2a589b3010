//! Z-order (Morton) index over a ring, used to narrow down ear containment checks.

use num_traits::float::Float;

use crate::node::{Arena, NodeIndex};

/// Upper bound of the quantized coordinate range (15 bits).
pub(crate) const Z_RANGE: f64 = 32767.0;

/// Bounding box transform mapping coordinates into the 15-bit z-order grid.
#[derive(Clone, Copy)]
pub(crate) struct ZGrid<T: Float> {
    pub(crate) min_x: T,
    pub(crate) min_y: T,
    /// inverse of the longer side of the bbox, scaled to [`Z_RANGE`]
    pub(crate) inv_size: T,
}

impl<T: Float> ZGrid<T> {
    /// Computes the grid from the bbox of `points`. Returns `None` for empty or
    /// zero-size input, in which case the caller falls back to brute-force ear checks.
    pub(crate) fn from_points(points: &[[T; 2]]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let [min_x, min_y] = rest.iter().fold(first, |[ax, ay], &[bx, by]| {
            [T::min(ax, bx), T::min(ay, by)]
        });
        let [max_x, max_y] = rest.iter().fold(first, |[ax, ay], &[bx, by]| {
            [T::max(ax, bx), T::max(ay, by)]
        });
        let size = (max_x - min_x).max(max_y - min_y);
        if size == T::zero() || !size.is_finite() {
            return None;
        }
        Some(Self {
            min_x,
            min_y,
            inv_size: T::from(Z_RANGE)? / size,
        })
    }

    /// z-order of a point
    pub(crate) fn z_order(&self, x: T, y: T) -> i32 {
        let x = self.quantize(x - self.min_x);
        let y = self.quantize(y - self.min_y);
        let mut xy = (x as i64) << 32 | y as i64;
        xy = (xy | (xy << 8)) & 0x00FF00FF00FF00FF;
        xy = (xy | (xy << 4)) & 0x0F0F0F0F0F0F0F0F;
        xy = (xy | (xy << 2)) & 0x3333333333333333;
        xy = (xy | (xy << 1)) & 0x5555555555555555;
        (xy >> 32 | xy << 1) as i32
    }

    // points outside the bbox (holes poking out of the outer ring) are clamped
    fn quantize(&self, offset: T) -> u32 {
        (offset * self.inv_size)
            .max(T::zero())
            .to_u32()
            .unwrap_or(0)
            .min(Z_RANGE as u32)
    }
}

/// Links the ring's nodes into a list sorted by z-order, computing missing keys.
pub(crate) fn index_curve<T: Float>(arena: &mut Arena<T>, start_i: NodeIndex, grid: &ZGrid<T>) {
    // the z list starts as the ring opened at `start_i`
    let mut p_i = start_i;
    loop {
        let p = &mut arena[p_i];
        let [x, y] = p.xy();
        p.z.get_or_insert_with(|| grid.z_order(x, y));
        p.prev_z_i = (p_i != start_i).then_some(p.prev_i);
        p.next_z_i = (p.next_i != start_i).then_some(p.next_i);
        p_i = p.next_i;
        if p_i == start_i {
            break;
        }
    }
    sort_linked(arena, start_i);
}

/// Bottom-up merge sort of the z list headed by `head_i`, stable on equal keys.
///
/// Simon Tatham's linked list merge sort,
/// http://www.chiark.greenend.org.uk/~sgtatham/algorithms/listsort.html
pub(crate) fn sort_linked<T: Float>(arena: &mut Arena<T>, head_i: NodeIndex) {
    let mut head = Some(head_i);
    let mut run = 1usize;

    loop {
        let mut left = head.take();
        let mut tail: Option<NodeIndex> = None;
        let mut merges = 0;

        while let Some(left_start) = left {
            merges += 1;
            // the right run begins `run` steps after the left one, or where the list ends
            let mut left_len = 1;
            let mut right = arena[left_start].next_z_i;
            while left_len < run {
                let Some(i) = right else { break };
                left_len += 1;
                right = arena[i].next_z_i;
            }
            let mut right_len = run;

            loop {
                let from_left = match (left.filter(|_| left_len > 0), right.filter(|_| right_len > 0)) {
                    (Some(l), Some(r)) => arena[l].z <= arena[r].z,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => break,
                };
                let side = if from_left { &mut left } else { &mut right };
                let Some(e_i) = *side else { break };
                *side = arena[e_i].next_z_i;
                if from_left {
                    left_len -= 1;
                } else {
                    right_len -= 1;
                }

                arena[e_i].prev_z_i = tail;
                match tail {
                    Some(t) => arena[t].next_z_i = Some(e_i),
                    None => head = Some(e_i),
                }
                tail = Some(e_i);
            }

            left = right;
        }

        if let Some(t) = tail {
            arena[t].next_z_i = None;
        }
        if merges <= 1 {
            return;
        }
        run *= 2;
    }
}
