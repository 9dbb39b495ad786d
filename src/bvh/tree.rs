//! Read-only tree snapshots and whole-tree queries.

use super::arena::Node;
use super::Bvh;
use crate::geom::Triangle;
use crate::util::{Error, Result, NULL_INDEX};

/// Immutable copy of the BVH handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub root_index: u32,
    pub node_count: u32,
    pub triangle_count: u32,
    pub triangles: Vec<Triangle>,
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(self.root_index as usize)
    }

    /// Traversal stack capacity needed to walk this tree.
    pub fn max_stack_size(&self) -> u32 {
        max_stack_size(&self.nodes, self.root_index)
    }

    /// Summed surface area of all internal nodes.
    pub fn cost(&self) -> f32 {
        tree_cost(&self.nodes)
    }
}

/// Peak depth of an explicit-stack depth-first walk from `root`.
///
/// Pops a node, pushes `child_a` then `child_b` for internal nodes, and
/// records the stack length after every step. Links to missing nodes are
/// skipped; a `root` outside `nodes` yields 0.
///
/// The initial push counts on purpose, so a lone root needs one slot.
/// Measuring only after each pop would report 0 there and under-size the
/// shader's stack.
pub fn max_stack_size(nodes: &[Node], root: u32) -> u32 {
    if nodes.get(root as usize).is_none() {
        return 0;
    }
    let mut stack = vec![root];
    let mut max = stack.len();
    while let Some(index) = stack.pop() {
        let Some(node) = nodes.get(index as usize) else {
            continue;
        };
        if let Some((a, b)) = node.children() {
            stack.push(a);
            stack.push(b);
        }
        max = max.max(stack.len());
    }
    max as u32
}

/// Summed surface area of all internal nodes.
pub fn tree_cost(nodes: &[Node]) -> f32 {
    nodes
        .iter()
        .filter(|n| !n.is_leaf())
        .map(|n| n.aabb.surface_area())
        .sum()
}

impl Bvh {
    /// Snapshot of the current tree.
    pub fn tree_data(&self) -> Tree {
        Tree {
            root_index: self.root,
            node_count: self.arena.len() as u32,
            triangle_count: self.triangles.len() as u32,
            triangles: self.triangles.clone(),
            nodes: self.arena.to_vec(),
        }
    }

    /// Stack capacity a depth-first GPU traversal must provision.
    pub fn max_stack_size(&self) -> u32 {
        max_stack_size(self.arena.as_slice(), self.root)
    }

    /// Summed surface area of internal nodes (lower is better).
    pub fn tree_cost(&self) -> f32 {
        tree_cost(self.arena.as_slice())
    }

    /// Check every structural invariant.
    ///
    /// - the root has no parent, every other node's parent lists it as a child
    /// - internal bounds equal the union of the children's bounds
    /// - parents contain their children
    /// - every node is reachable and every triangle has exactly one leaf
    pub fn validate(&self) -> Result<()> {
        self.validate_prefix(self.triangles.len())
    }

    /// [`validate`](Self::validate) over a tree holding only the first
    /// `inserted` triangles, as seen partway through a rebuild.
    pub(crate) fn validate_prefix(&self, inserted: usize) -> Result<()> {
        let nodes = self.arena.as_slice();
        let triangles = &self.triangles[..inserted.min(self.triangles.len())];
        if nodes.is_empty() {
            if self.root != NULL_INDEX || !triangles.is_empty() {
                return Err(Error::invalid("empty arena with root or triangles"));
            }
            return Ok(());
        }

        let expected = (2 * triangles.len()).saturating_sub(1);
        if nodes.len() != expected {
            return Err(Error::invalid(format!(
                "{} nodes for {} triangles (expected {expected})",
                nodes.len(),
                triangles.len()
            )));
        }
        let root = nodes
            .get(self.root as usize)
            .ok_or_else(|| Error::invalid(format!("root {} out of range", self.root)))?;
        if !root.is_root() {
            return Err(Error::invalid(format!(
                "root {} has parent {}",
                self.root, root.parent
            )));
        }

        let mut visited = vec![false; nodes.len()];
        let mut leaf_of = vec![NULL_INDEX; triangles.len()];
        let mut stack = vec![self.root];

        while let Some(index) = stack.pop() {
            let seen = visited
                .get_mut(index as usize)
                .ok_or_else(|| Error::invalid(format!("link to missing node {index}")))?;
            if *seen {
                return Err(Error::invalid(format!("node {index} reached twice")));
            }
            *seen = true;
            let node = &nodes[index as usize];

            match node.children() {
                Some((a, b)) => {
                    for child in [a, b] {
                        let c = nodes.get(child as usize).ok_or_else(|| {
                            Error::invalid(format!("node {index} links missing child {child}"))
                        })?;
                        if c.parent != index {
                            return Err(Error::invalid(format!(
                                "node {child} has parent {} but is a child of {index}",
                                c.parent
                            )));
                        }
                        if !node.aabb.contains(&c.aabb) {
                            return Err(Error::invalid(format!(
                                "node {index} does not contain child {child}"
                            )));
                        }
                        stack.push(child);
                    }
                    let joined = nodes[a as usize].aabb.union(&nodes[b as usize].aabb);
                    if node.aabb != joined {
                        return Err(Error::invalid(format!(
                            "node {index} bounds {:?} differ from children union {:?}",
                            node.aabb, joined
                        )));
                    }
                }
                None => {
                    let tri = node.triangle().unwrap_or(NULL_INDEX) as usize;
                    let slot = leaf_of.get_mut(tri).ok_or_else(|| {
                        Error::invalid(format!("leaf {index} references missing triangle {tri}"))
                    })?;
                    if *slot != NULL_INDEX {
                        return Err(Error::invalid(format!(
                            "triangle {tri} has leaves {} and {index}",
                            *slot
                        )));
                    }
                    *slot = index;
                    if node.aabb != triangles[tri].aabb() {
                        return Err(Error::invalid(format!(
                            "leaf {index} bounds differ from triangle {tri}"
                        )));
                    }
                }
            }
        }

        if let Some(orphan) = visited.iter().position(|&v| !v) {
            return Err(Error::invalid(format!("node {orphan} unreachable from root")));
        }
        Ok(())
    }
}
