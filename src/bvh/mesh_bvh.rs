//! Mesh store and BVH kept in lockstep.

use super::gpu_data::GpuTreeData;
use super::tree::Tree;
use super::Bvh;
use crate::config::BvhConfig;
use crate::geom::{Mesh, Vertex};
use crate::util::{Result, Vec3};

/// A welded mesh whose triangles are inserted into a BVH as they arrive.
#[derive(Clone, Debug)]
pub struct MeshBvh {
    mesh: Mesh,
    bvh: Bvh,
}

impl MeshBvh {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, BvhConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: BvhConfig) -> Self {
        Self {
            mesh: Mesh::with_config(name, &config),
            bvh: Bvh::with_config(config),
        }
    }

    /// Weld the corners, store the triangle and insert its leaf.
    ///
    /// Node storage is reserved before the mesh is touched, so an allocation
    /// failure leaves both sides unchanged.
    pub fn add_triangle(&mut self, vertices: [Vertex; 3], normal: Vec3) -> Result<u32> {
        self.bvh.reserve(1)?;
        let id = self.mesh.add_triangle(vertices, normal)?;
        let triangle = *self.mesh.triangle(id as usize)?;
        self.bvh.insert_triangle(triangle)?;
        tracing::trace!(triangle = id, nodes = self.bvh.node_count(), "triangle inserted");
        Ok(id)
    }

    /// Position-only variant of [`add_triangle`](Self::add_triangle).
    pub fn add_positions(&mut self, positions: [Vec3; 3], normal: Vec3) -> Result<u32> {
        self.add_triangle(positions.map(Vertex::new), normal)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn tree_data(&self) -> Tree {
        self.bvh.tree_data()
    }

    pub fn max_stack_size(&self) -> u32 {
        self.bvh.max_stack_size()
    }

    pub fn tree_cost(&self) -> f32 {
        self.bvh.tree_cost()
    }

    /// Rebuild the tree from every stored triangle.
    pub fn rebuild(&mut self) -> Result<()> {
        self.bvh.rebuild(self.mesh.triangles())
    }

    /// GPU buffers for the current tree.
    pub fn to_gpu(&self) -> GpuTreeData {
        GpuTreeData::from_bvh(&self.bvh)
    }
}
