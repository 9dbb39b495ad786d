//! Greedy local rotation: swap a node with its uncle when that shrinks the parent.

use super::Bvh;
use crate::util::NULL_INDEX;

impl Bvh {
    /// Try swapping `index` with its uncle.
    ///
    /// With `P` the parent and `G` the grandparent, the uncle `U` moves into
    /// `index`'s slot under `P` and `index` moves into `U`'s slot under `G`.
    /// The swap is committed only if `P`'s refitted surface area is strictly
    /// smaller; otherwise nothing is written. Returns whether it was applied.
    /// Indices outside the arena are never rotated.
    pub fn try_rotate(&mut self, index: u32) -> bool {
        let Some(parent) = self.arena.get(index).map(|n| n.parent) else {
            return false;
        };
        let Some(grandparent) = self.arena.get(parent).map(|n| n.parent) else {
            return false;
        };
        if grandparent == NULL_INDEX {
            return false;
        }

        let uncle = self.arena[grandparent].other_child(parent);
        let sibling = self.arena[parent].other_child(index);

        let before = self.arena[parent].aabb.surface_area();
        let rotated = self.arena[sibling].aabb.union(&self.arena[uncle].aabb);
        let after = rotated.surface_area();
        if after >= before {
            return false;
        }

        self.arena[parent].replace_child(index, uncle);
        self.arena[parent].aabb = rotated;
        self.arena[grandparent].replace_child(uncle, index);
        self.arena[uncle].parent = parent;
        self.arena[index].parent = grandparent;

        tracing::trace!(node = index, uncle, parent, before, after, "rotation applied");
        true
    }
}
