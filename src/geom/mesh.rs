//! Geometry store: welded vertices and append-only triangles.
//!
//! Vertices are welded with a loose positional tolerance rather than exact
//! equality. Two distinct vertices closer than the tolerance on every axis
//! silently merge; callers depending on reproducible vertex indices rely on
//! exactly this behavior, so it is not a robust welding pass.

use crate::config::BvhConfig;
use crate::geom::packed::PackedIndices;
use crate::util::{Aabb, Error, Result, Vec2, Vec3};

/// A mesh vertex. Immutable once stored.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Option<Vec2>,
    pub normal: Option<Vec3>,
}

impl Vertex {
    /// Position-only vertex.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    /// Attach texture coordinates.
    pub fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = Some(uv);
        self
    }

    /// Attach a vertex normal.
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = Some(normal);
        self
    }
}

impl From<Vec3> for Vertex {
    fn from(position: Vec3) -> Self {
        Self::new(position)
    }
}

/// A stored triangle.
///
/// `indices` point into the welded vertex array. `positions` keeps the corners
/// exactly as supplied, since the triangle's bounds are computed from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub normal: Vec3,
    pub positions: [Vec3; 3],
}

impl Triangle {
    /// Tight bounds of the supplied corners.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        let [v0, v1, v2] = self.positions;
        Aabb::from_triangle(v0, v1, v2)
    }
}

/// Deduplicating vertex / triangle store.
#[derive(Clone, Debug)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    tolerance: f32,
}

impl Mesh {
    /// Create an empty mesh with the default weld tolerance.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &BvhConfig::default())
    }

    /// Create an empty mesh using the config's weld tolerance.
    ///
    /// A NaN or negative tolerance falls back to the default.
    pub fn with_config(name: impl Into<String>, config: &BvhConfig) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            triangles: Vec::new(),
            tolerance: config.sanitized().dedup_tolerance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weld tolerance in use.
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get a triangle by index.
    pub fn triangle(&self, index: usize) -> Result<&Triangle> {
        self.triangles.get(index).ok_or(Error::TriangleOutOfBounds {
            index,
            count: self.triangles.len(),
        })
    }

    /// Bounds of a stored triangle.
    pub fn triangle_aabb(&self, index: usize) -> Result<Aabb> {
        self.triangle(index).map(Triangle::aabb)
    }

    /// Index of the most recently added vertex within tolerance of `p`.
    pub fn find_vertex(&self, p: Vec3) -> Option<u32> {
        let tol = self.tolerance;
        self.vertices
            .iter()
            .rposition(|v| {
                let d = (v.position - p).abs();
                d.x < tol && d.y < tol && d.z < tol
            })
            .map(|i| i as u32)
    }

    /// Add a triangle, welding its vertices against the existing ones.
    ///
    /// Returns the new triangle's index.
    pub fn add_triangle(&mut self, vertices: [Vertex; 3], normal: Vec3) -> Result<u32> {
        if self.triangles.len() >= u32::MAX as usize {
            return Err(Error::CapacityExceeded {
                what: "triangles",
                limit: u32::MAX as usize,
            });
        }
        self.triangles
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailed { requested: 1 })?;

        let mut indices = [0u32; 3];
        for (slot, vertex) in indices.iter_mut().zip(vertices.iter()) {
            *slot = match self.find_vertex(vertex.position) {
                Some(existing) => existing,
                None => self.push_vertex(*vertex)?,
            };
        }

        let index = self.triangles.len() as u32;
        self.triangles.push(Triangle {
            indices,
            normal,
            positions: vertices.map(|v| v.position),
        });
        Ok(index)
    }

    /// Convenience for position-only input.
    pub fn add_positions(&mut self, positions: [Vec3; 3], normal: Vec3) -> Result<u32> {
        self.add_triangle(positions.map(Vertex::new), normal)
    }

    /// Triangle indices in the compact 20-bit encoding.
    pub fn packed_indices(&self) -> Result<Vec<PackedIndices>> {
        self.triangles
            .iter()
            .map(|t| PackedIndices::pack(t.indices))
            .collect()
    }

    fn push_vertex(&mut self, vertex: Vertex) -> Result<u32> {
        if self.vertices.len() >= u32::MAX as usize {
            return Err(Error::VertexIndexOverflow(u32::MAX));
        }
        self.vertices
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailed { requested: 1 })?;
        self.vertices.push(vertex);
        Ok((self.vertices.len() - 1) as u32)
    }
}
