//! Ordered collection of meshes feeding a single BVH.

use crate::config::BvhConfig;
use crate::geom::mesh::{Mesh, Triangle, Vertex};
use crate::util::{Error, Result};

/// Meshes in insertion order, with a dirty flag for the consumer.
#[derive(Clone, Debug, Default)]
pub struct MeshSet {
    meshes: Vec<Mesh>,
    up_to_date: bool,
}

impl MeshSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh; marks the set as changed.
    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
        self.up_to_date = false;
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// False after a push until [`triangle_array`](Self::triangle_array) is read.
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    pub fn num_triangles(&self) -> usize {
        self.meshes.iter().map(Mesh::num_triangles).sum()
    }

    /// All vertices, mesh after mesh.
    pub fn vertex_array(&self) -> Vec<Vertex> {
        self.meshes
            .iter()
            .flat_map(|m| m.vertices().iter().copied())
            .collect()
    }

    /// All triangles, with vertex indices offset into [`vertex_array`](Self::vertex_array).
    ///
    /// Fails with `CapacityExceeded` once the combined vertex count no longer
    /// fits a `u32` index.
    pub fn triangle_array(&mut self) -> Result<Vec<Triangle>> {
        let mut out = Vec::with_capacity(self.num_triangles());
        let mut base = 0u32;
        for mesh in &self.meshes {
            for t in mesh.triangles() {
                out.push(Triangle {
                    indices: offset_indices(t.indices, base)?,
                    ..*t
                });
            }
            let count = u32::try_from(mesh.num_vertices()).map_err(|_| vertex_overflow())?;
            base = base.checked_add(count).ok_or_else(vertex_overflow)?;
        }

        self.up_to_date = true;
        Ok(out)
    }

    /// Merge everything into one mesh, welding across mesh boundaries.
    pub fn combined_mesh(&self, name: impl Into<String>, config: &BvhConfig) -> Result<Mesh> {
        let mut combined = Mesh::with_config(name, config);
        for mesh in &self.meshes {
            let vertices = mesh.vertices();
            for t in mesh.triangles() {
                let corners = [0, 1, 2].map(|k| Vertex {
                    position: t.positions[k],
                    ..vertices[t.indices[k] as usize]
                });
                combined.add_triangle(corners, t.normal)?;
            }
        }
        Ok(combined)
    }
}

fn vertex_overflow() -> Error {
    Error::CapacityExceeded {
        what: "vertices",
        limit: u32::MAX as usize,
    }
}

/// Shift a triangle's indices by `base`, failing instead of wrapping.
fn offset_indices(indices: [u32; 3], base: u32) -> Result<[u32; 3]> {
    let mut out = indices;
    for i in &mut out {
        *i = i.checked_add(base).ok_or_else(vertex_overflow)?;
    }
    Ok(out)
}
