//! Serialize a BVH snapshot into GPU storage buffers.
//!
//! Flat array layout for upload:
//! - 48-byte nodes keeping the parent/child links of the incremental tree
//! - 64-byte triangles with corners and face normal padded to vec4

use bytemuck::{Pod, Zeroable};

use super::tree::Tree;
use super::Bvh;
use crate::geom::Triangle;
use crate::util::NULL_INDEX;

/// GPU-friendly BVH node (48 bytes, matches the WGSL/HLSL struct).
///
/// Leaf: `triangle` set, children = `NULL_INDEX`, `is_leaf = 1`.
/// Internal: `triangle = NULL_INDEX`, both children set, `is_leaf = 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuBvhNode {
    pub aabb_min: [f32; 3],
    pub triangle: u32,
    pub aabb_max: [f32; 3],
    pub parent: u32,
    pub child_a: u32,
    pub child_b: u32,
    pub is_leaf: u32,
    pub _pad: u32,
}

/// Triangle primitive for GPU storage (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 3],
    pub _pad0: u32,
    pub v1: [f32; 3],
    pub _pad1: u32,
    pub v2: [f32; 3],
    pub _pad2: u32,
    pub normal: [f32; 3],
    pub _pad3: u32,
}

/// Uniform header describing the buffers (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuTreeHeader {
    pub root_index: u32,
    pub node_count: u32,
    pub triangle_count: u32,
    pub max_stack_size: u32,
}

impl From<&Triangle> for GpuTriangle {
    fn from(t: &Triangle) -> Self {
        Self {
            v0: t.positions[0].to_array(),
            _pad0: 0,
            v1: t.positions[1].to_array(),
            _pad1: 0,
            v2: t.positions[2].to_array(),
            _pad2: 0,
            normal: t.normal.to_array(),
            _pad3: 0,
        }
    }
}

/// Complete tree data ready for GPU upload.
pub struct GpuTreeData {
    /// Flat node array, indices identical to the CPU arena.
    pub nodes: Vec<GpuBvhNode>,
    /// Triangles in insertion order (leaves index into this).
    pub triangles: Vec<GpuTriangle>,
    pub header: GpuTreeHeader,
}

impl GpuTreeData {
    /// Build GPU-ready data from a tree snapshot.
    #[tracing::instrument(skip_all, fields(node_count = tree.node_count))]
    pub fn from_tree(tree: &Tree) -> Self {
        let nodes = tree
            .nodes
            .iter()
            .map(|n| {
                let (child_a, child_b) = n.children().unwrap_or((NULL_INDEX, NULL_INDEX));
                GpuBvhNode {
                    aabb_min: n.aabb.min.to_array(),
                    triangle: n.triangle().unwrap_or(NULL_INDEX),
                    aabb_max: n.aabb.max.to_array(),
                    parent: n.parent,
                    child_a,
                    child_b,
                    is_leaf: n.is_leaf() as u32,
                    _pad: 0,
                }
            })
            .collect();

        let triangles = tree.triangles.iter().map(GpuTriangle::from).collect();

        Self {
            nodes,
            triangles,
            header: GpuTreeHeader {
                root_index: tree.root_index,
                node_count: tree.node_count,
                triangle_count: tree.triangle_count,
                max_stack_size: tree.max_stack_size(),
            },
        }
    }

    /// Shorthand for `from_tree(&bvh.tree_data())`.
    pub fn from_bvh(bvh: &Bvh) -> Self {
        Self::from_tree(&bvh.tree_data())
    }

    /// BVH nodes as bytes.
    pub fn nodes_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Triangle data as bytes.
    pub fn triangles_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Header as bytes.
    pub fn header_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::tests::box_triangle;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<GpuBvhNode>(), 48);
        assert_eq!(std::mem::size_of::<GpuTriangle>(), 64);
        assert_eq!(std::mem::size_of::<GpuTreeHeader>(), 16);
    }

    #[test]
    fn test_from_bvh() {
        let mut bvh = Bvh::new();
        for i in 0..6 {
            bvh.insert_triangle(box_triangle(i as f32 * 4.0)).unwrap();
        }
        let gpu = GpuTreeData::from_bvh(&bvh);

        assert_eq!(gpu.header.root_index, bvh.root());
        assert_eq!(gpu.header.node_count, 11);
        assert_eq!(gpu.header.triangle_count, 6);
        assert_eq!(gpu.header.max_stack_size, bvh.max_stack_size());
        assert_eq!(gpu.nodes_bytes().len(), 11 * 48);
        assert_eq!(gpu.triangles_bytes().len(), 6 * 64);
        assert_eq!(gpu.header_bytes().len(), 16);

        for (gpu_node, node) in gpu.nodes.iter().zip(bvh.nodes()) {
            assert_eq!(gpu_node.is_leaf == 1, node.is_leaf());
            assert_eq!(gpu_node.parent, node.parent);
            assert_eq!(gpu_node.aabb_min, node.aabb.min.to_array());
            match node.children() {
                Some((a, b)) => {
                    assert_eq!((gpu_node.child_a, gpu_node.child_b), (a, b));
                    assert_eq!(gpu_node.triangle, NULL_INDEX);
                }
                None => {
                    assert_eq!(gpu_node.child_a, NULL_INDEX);
                    assert_eq!(Some(gpu_node.triangle), node.triangle());
                }
            }
        }
        assert_eq!(gpu.nodes[bvh.root() as usize].parent, NULL_INDEX);
    }

    #[test]
    fn test_triangle_layout() {
        let t = box_triangle(2.0);
        let g = GpuTriangle::from(&t);
        assert_eq!(g.v0, [2.0, 0.0, 0.0]);
        assert_eq!(g.v1, [3.0, 1.0, 0.0]);
        assert_eq!(g.normal, [0.0, 0.0, 1.0]);
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&g));
        assert_eq!(words[3], 0);
        assert_eq!(words[15], 0);
    }
}
