//! Stackless hit/miss layout.
//!
//! The tree is flattened in depth-first preorder (`child_a` before `child_b`).
//! Each entry stores two jumps:
//! - `hit`: where to go when the ray hits the box. For internal nodes this is
//!   `child_a`, which always sits at the next position. For leaves it is `miss`.
//! - `miss`: the next subtree to the right. That is the `child_b` of the
//!   nearest ancestor-or-self reached through a `child_a` link, or
//!   [`NULL_INDEX`] when there is none.
//!
//! A shader can then walk the tree with a single cursor and no stack.

use bytemuck::{Pod, Zeroable};

use super::tree::Tree;
use crate::util::{Aabb, Vec3, NULL_INDEX};

/// One entry of the hit/miss array (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LinkedNode {
    pub aabb_min: [f32; 3],
    pub hit: u32,
    pub aabb_max: [f32; 3],
    pub miss: u32,
    /// Triangle for leaves, `NULL_INDEX` for internal nodes.
    pub triangle: u32,
    pub _pad: [u32; 3],
}

impl LinkedNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.triangle != NULL_INDEX
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(Vec3::from(self.aabb_min), Vec3::from(self.aabb_max))
    }
}

/// Flatten a tree snapshot into hit/miss order.
#[tracing::instrument(skip_all, fields(node_count = tree.node_count))]
pub fn flatten_linked(tree: &Tree) -> Vec<LinkedNode> {
    if tree.root().is_none() {
        return Vec::new();
    }
    let nodes = &tree.nodes;

    // Preorder positions
    let mut position = vec![NULL_INDEX; nodes.len()];
    let mut next = 0u32;
    let mut stack = vec![tree.root_index];
    while let Some(index) = stack.pop() {
        position[index as usize] = next;
        next += 1;
        if let Some((a, b)) = nodes[index as usize].children() {
            stack.push(b);
            stack.push(a);
        }
    }

    let mut out = vec![LinkedNode::zeroed(); next as usize];
    let mut stack = vec![(tree.root_index, NULL_INDEX)];
    while let Some((index, miss)) = stack.pop() {
        let node = &nodes[index as usize];
        let (hit, triangle) = match node.children() {
            Some((a, b)) => {
                stack.push((b, miss));
                stack.push((a, position[b as usize]));
                (position[a as usize], NULL_INDEX)
            }
            None => (miss, node.triangle().unwrap_or(NULL_INDEX)),
        };
        out[position[index as usize] as usize] = LinkedNode {
            aabb_min: node.aabb.min.to_array(),
            hit,
            aabb_max: node.aabb.max.to_array(),
            miss,
            triangle,
            _pad: [0; 3],
        };
    }
    out
}

/// Walk a hit/miss array the way the traversal shader does.
///
/// `accept` plays the role of the ray/box test. Returns the triangles of every
/// accepted leaf, in visit order.
pub fn traverse_linked(nodes: &[LinkedNode], mut accept: impl FnMut(&Aabb) -> bool) -> Vec<u32> {
    let mut hits = Vec::new();
    let mut cursor = if nodes.is_empty() { NULL_INDEX } else { 0 };
    while cursor != NULL_INDEX {
        let node = &nodes[cursor as usize];
        if accept(&node.aabb()) {
            if node.is_leaf() {
                hits.push(node.triangle);
            }
            cursor = node.hit;
        } else {
            cursor = node.miss;
        }
    }
    hits
}
