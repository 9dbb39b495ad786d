//! Leaf insertion: sibling search, relink and refit.

use smallvec::SmallVec;

use super::arena::{Node, NodeKind};
use super::Bvh;
use crate::util::{Aabb, Result, NULL_INDEX};

/// Candidate stack; spills to the heap only for very deep trees.
type CandidateStack = SmallVec<[u32; 64]>;

impl Bvh {
    /// Insert a leaf for `triangle` with bounds `aabb`. Returns the leaf index.
    pub(crate) fn insert_leaf(&mut self, triangle: u32, aabb: Aabb) -> Result<u32> {
        let first = self.arena.is_empty();
        self.arena.reserve(if first { 1 } else { 2 })?;

        let leaf = self.arena.allocate(Node::leaf(triangle, aabb))?;
        if first {
            self.root = leaf;
            return Ok(leaf);
        }

        let sibling = self.find_best_sibling(&aabb);
        let old_parent = self.arena[sibling].parent;
        let joined = aabb.union(&self.arena[sibling].aabb);
        let parent = self
            .arena
            .allocate(Node::internal(sibling, leaf, joined, old_parent))?;

        if old_parent == NULL_INDEX {
            self.root = parent;
            tracing::trace!(root = parent, "new root");
        } else {
            self.arena[old_parent].replace_child(sibling, parent);
        }
        self.arena[sibling].parent = parent;
        self.arena[leaf].parent = parent;

        self.refit_from(parent);
        Ok(leaf)
    }

    /// Branch-and-bound search for the cheapest sibling of a new leaf.
    ///
    /// Candidates are visited depth-first from a LIFO stack; children of the
    /// current best are only explored while their lower bound can still win.
    pub(crate) fn find_best_sibling(&self, leaf_box: &Aabb) -> u32 {
        let mut stack: CandidateStack = SmallVec::new();
        stack.push(self.root);

        let leaf_area = f64::from(leaf_box.surface_area());
        let mut best = self.root;
        let mut best_cost = f64::INFINITY;

        while let Some(index) = stack.pop() {
            let node = &self.arena[index];

            let joined = leaf_box.union(&node.aabb);
            let direct = f64::from(joined.surface_area());
            let indirect = self.ancestor_growth(joined, node.parent);
            let total = direct + indirect;

            if total < best_cost {
                best_cost = total;
                best = index;

                if let NodeKind::Internal { child_a, child_b } = node.kind {
                    let lower_bound = leaf_area + self.ancestor_growth(node.aabb, node.parent);
                    if lower_bound < best_cost {
                        stack.push(child_a);
                        stack.push(child_b);
                    }
                }
            }
        }

        tracing::trace!(sibling = best, cost = best_cost, "sibling chosen");
        best
    }

    /// Surface area added to every ancestor from `start` up if it had to hold `running`.
    fn ancestor_growth(&self, mut running: Aabb, start: u32) -> f64 {
        let mut cost = 0.0;
        let mut index = start;
        while index != NULL_INDEX {
            let ancestor = &self.arena[index];
            running = running.union(&ancestor.aabb);
            cost += f64::from(running.surface_area() - ancestor.aabb.surface_area());
            index = ancestor.parent;
        }
        cost
    }

    /// Recompute bounds from `start` to the root, rotating at each level.
    fn refit_from(&mut self, start: u32) {
        let mut index = start;
        while index != NULL_INDEX {
            if let Some((a, b)) = self.arena[index].children() {
                self.arena[index].aabb = self.arena[a].aabb.union(&self.arena[b].aabb);
            }
            if self.config.rotations {
                self.try_rotate(index);
            }
            // Read after rotating: a rotation moves `index` under its grandparent.
            index = self.arena[index].parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::tests::box_triangle;
    use crate::config::BvhConfig;
    use crate::util::Vec3;

    fn no_rotations() -> Bvh {
        Bvh::with_config(BvhConfig {
            rotations: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_sibling_is_nearest_leaf() {
        let mut bvh = no_rotations();
        bvh.insert_triangle(box_triangle(0.0)).unwrap(); // node 0
        bvh.insert_triangle(box_triangle(100.0)).unwrap(); // node 1, parent 2

        // A box touching the first leaf pairs with it, not with the root.
        let probe = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert_eq!(bvh.find_best_sibling(&probe), 0);

        let probe = Aabb::new(Vec3::new(99.0, 0.0, 0.0), Vec3::new(100.0, 1.0, 1.0));
        assert_eq!(bvh.find_best_sibling(&probe), 1);
    }

    #[test]
    fn test_enclosing_box_pairs_with_root() {
        let mut bvh = no_rotations();
        bvh.insert_triangle(box_triangle(0.0)).unwrap();
        bvh.insert_triangle(box_triangle(2.0)).unwrap();
        let huge = Aabb::new(Vec3::splat(-50.0), Vec3::splat(50.0));
        assert_eq!(bvh.find_best_sibling(&huge), bvh.root());
    }

    #[test]
    fn test_relink_under_old_parent() {
        let mut bvh = no_rotations();
        bvh.insert_triangle(box_triangle(0.0)).unwrap();
        bvh.insert_triangle(box_triangle(100.0)).unwrap();
        bvh.insert_triangle(box_triangle(1.5)).unwrap();

        // Leaf 3 pairs with leaf 0 under new parent 4, which takes 0's old slot.
        let nodes = bvh.nodes();
        assert_eq!(nodes[4].children(), Some((0, 3)));
        assert_eq!(nodes[4].parent, 2);
        assert_eq!(nodes[2].children(), Some((4, 1)));
        assert_eq!(nodes[0].parent, 4);
        assert_eq!(nodes[3].parent, 4);
        assert_eq!(bvh.root(), 2);
        assert_eq!(nodes[4].aabb.max, Vec3::new(2.5, 1.0, 1.0));
        bvh.validate().unwrap();
    }

    #[test]
    fn test_ancestor_growth_zero_inside() {
        let mut bvh = no_rotations();
        bvh.insert_triangle(box_triangle(0.0)).unwrap();
        bvh.insert_triangle(box_triangle(10.0)).unwrap();
        let inner = Aabb::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(bvh.ancestor_growth(inner, bvh.root()), 0.0);

        let outside = Aabb::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 1.0));
        assert!(bvh.ancestor_growth(outside, bvh.root()) > 0.0);
    }
}
