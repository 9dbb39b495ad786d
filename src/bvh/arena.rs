//! Append-only node storage.
//!
//! Nodes are addressed by `u32` index and never move or disappear once
//! allocated; restructuring only rewrites parent/child links. [`NULL_INDEX`]
//! marks a missing parent (root only) and can never be handed out.

use std::ops::{Index, IndexMut};

use crate::util::{Aabb, Error, Result, NULL_INDEX};

/// Leaf or internal payload of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// References exactly one triangle.
    Leaf { triangle: u32 },
    /// References exactly two children.
    Internal { child_a: u32, child_b: u32 },
}

/// A BVH node: bounds, parent link and payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub aabb: Aabb,
    pub parent: u32,
    pub kind: NodeKind,
}

impl Node {
    /// Parentless leaf.
    pub fn leaf(triangle: u32, aabb: Aabb) -> Self {
        Self {
            aabb,
            parent: NULL_INDEX,
            kind: NodeKind::Leaf { triangle },
        }
    }

    /// Internal node over two existing children.
    pub fn internal(child_a: u32, child_b: u32, aabb: Aabb, parent: u32) -> Self {
        Self {
            aabb,
            parent,
            kind: NodeKind::Internal { child_a, child_b },
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent == NULL_INDEX
    }

    /// Triangle index for leaves.
    #[inline]
    pub fn triangle(&self) -> Option<u32> {
        match self.kind {
            NodeKind::Leaf { triangle } => Some(triangle),
            NodeKind::Internal { .. } => None,
        }
    }

    /// `(child_a, child_b)` for internal nodes.
    #[inline]
    pub fn children(&self) -> Option<(u32, u32)> {
        match self.kind {
            NodeKind::Internal { child_a, child_b } => Some((child_a, child_b)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// The child that is not `child`, or `NULL_INDEX` for leaves.
    #[inline]
    pub fn other_child(&self, child: u32) -> u32 {
        match self.kind {
            NodeKind::Internal { child_a, child_b } => {
                if child_a == child {
                    child_b
                } else {
                    child_a
                }
            }
            NodeKind::Leaf { .. } => NULL_INDEX,
        }
    }

    /// Point the slot holding `old` at `new`. No-op on leaves.
    #[inline]
    pub fn replace_child(&mut self, old: u32, new: u32) {
        if let NodeKind::Internal { child_a, child_b } = &mut self.kind {
            if *child_a == old {
                *child_a = new;
            } else {
                *child_b = new;
            }
        }
    }
}

/// Growable node storage with stable indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, index: u32) -> Option<&Node> {
        self.nodes.get(index as usize)
    }

    /// Make room for `additional` nodes without handing out the sentinel.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .nodes
            .len()
            .checked_add(additional)
            .ok_or(Error::NodeIndexOverflow)?;
        // Highest index handed out is needed - 1; it must stay below NULL_INDEX.
        if needed > NULL_INDEX as usize {
            return Err(Error::NodeIndexOverflow);
        }
        self.nodes
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailed {
                requested: additional,
            })
    }

    /// Append a node and return its index.
    pub fn allocate(&mut self, node: Node) -> Result<u32> {
        self.reserve(1)?;
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        Ok(index)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.nodes.clone()
    }
}

impl Index<u32> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }
}

impl IndexMut<u32> for NodeArena {
    #[inline]
    fn index_mut(&mut self, index: u32) -> &mut Node {
        &mut self.nodes[index as usize]
    }
}
