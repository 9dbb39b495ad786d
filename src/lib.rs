//! # tracer-bvh
//!
//! Incremental bounding volume hierarchy over a growing triangle mesh, built
//! for a GPU ray tracer that streams geometry in one triangle at a time.
//!
//! Each new triangle is placed by a surface-area-heuristic branch-and-bound
//! search, and the tree is kept shallow by local rotations while refitting.
//! The result is exported as flat, GPU-ready arrays together with the stack
//! depth a traversal shader needs.
//!
//! ## Modules
//!
//! - [`util`] - Box algebra, errors, logging setup
//! - [`config`] - Serializable build settings
//! - [`geom`] - Vertex-welding mesh store and packed indices
//! - [`bvh`] - Tree, insertion, rotation, snapshots and GPU layouts
//!
//! ## Example
//!
//! ```ignore
//! use tracer_bvh::prelude::*;
//!
//! let mut scene = MeshBvh::new("scene");
//! scene.add_positions([Vec3::ZERO, Vec3::X, Vec3::Y], Vec3::Z)?;
//!
//! let tree = scene.tree_data();
//! println!("{} nodes, stack {}", tree.node_count, tree.max_stack_size());
//! ```

pub mod bvh;
pub mod config;
pub mod geom;
pub mod util;

// Re-export commonly used types
pub use bvh::{Bvh, MeshBvh, Tree};
pub use config::BvhConfig;
pub use geom::Mesh;
pub use util::{Aabb, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bvh::{Bvh, GpuTreeData, MeshBvh, Node, NodeKind, Tree};
    pub use crate::config::BvhConfig;
    pub use crate::geom::*;
    pub use crate::util::{Aabb, Error, Result, Vec2, Vec3, NULL_INDEX};
}
