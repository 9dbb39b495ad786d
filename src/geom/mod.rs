//! Geometry store.
//!
//! - [`Mesh`] - welded vertices plus append-only triangles with bounds
//! - [`MeshSet`] - several meshes concatenated for one build
//! - [`PackedIndices`] - 20-bit triangle index encoding for GPU upload

mod mesh;
mod mesh_set;
mod packed;

pub use mesh::*;
pub use mesh_set::*;
pub use packed::*;
