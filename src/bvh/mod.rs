//! Incremental bounding volume hierarchy.
//!
//! Triangles are inserted one at a time. Each insertion runs a
//! branch-and-bound search for the sibling that grows the summed surface area
//! of the tree the least, splices in a new parent, then refits the path to the
//! root while trying one local rotation per level.
//!
//! ## Architecture
//! ```text
//! Mesh::add_triangle → Bvh::insert_triangle → sibling search → relink → refit + rotate
//!                                                                     ↓
//!                         Tree snapshot → linked (hit/miss) / GpuTreeData → renderer
//! ```

mod arena;
mod insert;
mod rotate;

pub mod gpu_data;
pub mod linked;
pub mod mesh_bvh;
pub mod tree;

pub use arena::{Node, NodeArena, NodeKind};
pub use gpu_data::{GpuBvhNode, GpuTreeData, GpuTriangle};
pub use linked::{flatten_linked, LinkedNode};
pub use mesh_bvh::MeshBvh;
pub use tree::Tree;

use rayon::prelude::*;

use crate::config::BvhConfig;
use crate::geom::{Mesh, Triangle};
use crate::util::{Aabb, Error, Result, NULL_INDEX};

/// BVH over a growing triangle list.
#[derive(Debug, Clone)]
pub struct Bvh {
    arena: NodeArena,
    root: u32,
    triangles: Vec<Triangle>,
    config: BvhConfig,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new()
    }
}

impl Bvh {
    /// Empty tree with default settings.
    pub fn new() -> Self {
        Self::with_config(BvhConfig::default())
    }

    /// Empty tree with explicit settings (invalid values fall back to defaults).
    pub fn with_config(config: BvhConfig) -> Self {
        Self {
            arena: NodeArena::new(),
            root: NULL_INDEX,
            triangles: Vec::new(),
            config: config.sanitized(),
        }
    }

    /// Batch build over every triangle of `mesh`.
    pub fn from_mesh(mesh: &Mesh, config: BvhConfig) -> Result<Self> {
        Self::from_triangles(mesh.triangles(), config)
    }

    /// Batch build over a complete triangle set, in order.
    pub fn from_triangles(triangles: &[Triangle], config: BvhConfig) -> Result<Self> {
        let mut bvh = Self::with_config(config);
        bvh.rebuild(triangles)?;
        Ok(bvh)
    }

    /// Discard the current tree and insert `triangles` from scratch.
    ///
    /// Produces the same tree as inserting them one by one into an empty BVH.
    #[tracing::instrument(skip_all, fields(tri_count = triangles.len()))]
    pub fn rebuild(&mut self, triangles: &[Triangle]) -> Result<()> {
        self.clear();

        // Bounds are independent per triangle; only the insertion is serial.
        let aabbs: Vec<Aabb> = triangles.par_iter().map(Triangle::aabb).collect();

        self.reserve(triangles.len())?;
        self.triangles.extend_from_slice(triangles);
        for (i, aabb) in aabbs.into_iter().enumerate() {
            self.insert_leaf(i as u32, aabb)?;
            if self.config.validate_each_insert {
                self.validate_prefix(i + 1)?;
            }
        }

        tracing::debug!(
            nodes = self.arena.len(),
            cost = self.tree_cost(),
            "BVH rebuilt"
        );
        Ok(())
    }

    /// Append a triangle and insert its leaf. Returns the triangle index.
    ///
    /// Capacity and allocation errors are raised before anything is written,
    /// leaving the tree as it was. An `InvariantViolation` from
    /// `validate_each_insert` is reported after the leaf has been linked.
    pub fn insert_triangle(&mut self, triangle: Triangle) -> Result<u32> {
        self.reserve(1)?;
        let index = self.triangles.len() as u32;
        let aabb = triangle.aabb();
        self.triangles.push(triangle);
        self.insert_leaf(index, aabb)?;

        if self.config.validate_each_insert {
            self.validate()?;
        }
        Ok(index)
    }

    /// Pre-allocate room for `triangles` more insertions.
    pub fn reserve(&mut self, triangles: usize) -> Result<()> {
        if triangles == 0 {
            return Ok(());
        }
        let count = self
            .triangles
            .len()
            .checked_add(triangles)
            .ok_or(Error::NodeIndexOverflow)?;
        if count > NULL_INDEX as usize {
            return Err(Error::CapacityExceeded {
                what: "triangles",
                limit: NULL_INDEX as usize,
            });
        }
        // One leaf per triangle, one parent per triangle after the first.
        let nodes = if self.arena.is_empty() {
            2 * triangles - 1
        } else {
            2 * triangles
        };
        self.arena.reserve(nodes)?;
        self.triangles
            .try_reserve(triangles)
            .map_err(|_| Error::AllocationFailed {
                requested: triangles,
            })
    }

    /// Drop every node and triangle, keeping the config.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.triangles.clear();
        self.root = NULL_INDEX;
    }

    /// Root node index, `NULL_INDEX` when empty.
    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        self.arena.as_slice()
    }

    pub fn node(&self, index: u32) -> Option<&Node> {
        self.arena.get(index)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Bounds of the whole tree, `Aabb::EMPTY` when empty.
    pub fn bounds(&self) -> Aabb {
        self.arena
            .get(self.root)
            .map(|n| n.aabb)
            .unwrap_or(Aabb::EMPTY)
    }
}
