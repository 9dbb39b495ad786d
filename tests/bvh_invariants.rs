//! Integration tests for incremental BVH construction.

use tracer_bvh::bvh::{flatten_linked, GpuTreeData};
use tracer_bvh::prelude::*;

/// Small deterministic generator so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }

    fn point(&mut self, scale: f32) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) * scale
    }
}

fn random_triangle(rng: &mut Lcg) -> [Vec3; 3] {
    let base = rng.point(100.0);
    [base, base + rng.point(3.0), base + rng.point(3.0)]
}

fn unit_box_corners(x: f32) -> [Vec3; 3] {
    [
        Vec3::new(x, 0.0, 0.0),
        Vec3::new(x + 1.0, 1.0, 0.0),
        Vec3::new(x, 1.0, 1.0),
    ]
}

#[test]
fn test_invariants_hold_after_every_insert() {
    let mut rng = Lcg(7);
    let mut scene = MeshBvh::new("random");

    for n in 1..=300u32 {
        scene
            .add_positions(random_triangle(&mut rng), Vec3::Z)
            .expect("insert failed");
        let bvh = scene.bvh();
        bvh.validate().expect("invariant broken");
        assert_eq!(bvh.node_count() as u32, 2 * n - 1);
        assert!(bvh.max_stack_size() >= 1);
        assert!(bvh.max_stack_size() as usize <= bvh.node_count());
    }
}

#[test]
fn test_invariants_without_rotations() {
    let config = BvhConfig {
        rotations: false,
        validate_each_insert: true,
        ..Default::default()
    };
    let mut rng = Lcg(99);
    let mut scene = MeshBvh::with_config("plain", config);
    for _ in 0..150 {
        scene.add_positions(random_triangle(&mut rng), Vec3::Y).unwrap();
    }
    assert_eq!(scene.bvh().node_count(), 299);
}

#[test]
fn test_single_and_pair() {
    let mut scene = MeshBvh::new("pair");
    scene.add_positions(unit_box_corners(0.0), Vec3::Z).unwrap();

    let tree = scene.tree_data();
    assert_eq!((tree.node_count, tree.triangle_count), (1, 1));
    assert_eq!(tree.root().map(Node::is_leaf), Some(true));
    assert_eq!(tree.max_stack_size(), 1);

    scene.add_positions(unit_box_corners(4.0), Vec3::Z).unwrap();
    let tree = scene.tree_data();
    assert_eq!((tree.node_count, tree.triangle_count), (3, 2));
    let root = tree.root().unwrap();
    assert_eq!(root.parent, NULL_INDEX);
    let (a, b) = root.children().unwrap();
    assert!(tree.nodes[a as usize].is_leaf());
    assert!(tree.nodes[b as usize].is_leaf());
    assert_eq!(root.aabb, Aabb::new(Vec3::ZERO, Vec3::new(5.0, 1.0, 1.0)));
    assert_eq!(tree.max_stack_size(), 2);
}

#[test]
fn test_stack_depth_stays_logarithmic() {
    let mut scene = MeshBvh::new("row");
    for i in 0..1024 {
        scene
            .add_positions(unit_box_corners(i as f32 * 10.0), Vec3::Z)
            .unwrap();
    }
    scene.bvh().validate().unwrap();
    // log2(1024) = 10
    let depth = scene.max_stack_size();
    assert!(depth <= 16, "stack depth {depth}");
}

#[test]
fn test_batch_matches_incremental() {
    let mut rng = Lcg(2024);
    let mut scene = MeshBvh::new("batch");
    for _ in 0..200 {
        scene.add_positions(random_triangle(&mut rng), Vec3::X).unwrap();
    }
    let batch = Bvh::from_mesh(scene.mesh(), BvhConfig::default()).unwrap();
    assert_eq!(batch.tree_data(), scene.tree_data());
}

#[test]
fn test_exports_agree() {
    let mut rng = Lcg(5);
    let mut scene = MeshBvh::new("export");
    for _ in 0..64 {
        scene.add_positions(random_triangle(&mut rng), Vec3::Z).unwrap();
    }
    let tree = scene.tree_data();

    let gpu = GpuTreeData::from_tree(&tree);
    assert_eq!(gpu.header.root_index, tree.root_index);
    assert_eq!(gpu.nodes.len(), tree.nodes.len());
    assert_eq!(gpu.triangles.len(), 64);

    let linked = flatten_linked(&tree);
    assert_eq!(linked.len(), tree.nodes.len());
    assert_eq!(linked.iter().filter(|n| n.is_leaf()).count(), 64);
}

#[test]
fn test_dedup_tolerance_from_config() {
    let build = |tolerance: f32| {
        let config = BvhConfig {
            dedup_tolerance: tolerance,
            ..Default::default()
        };
        let mut scene = MeshBvh::with_config("weld", config);
        scene
            .add_positions([Vec3::ZERO, Vec3::X, Vec3::Y], Vec3::Z)
            .unwrap();
        scene
            .add_positions(
                [Vec3::new(1.15, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::ONE],
                Vec3::Z,
            )
            .unwrap();
        scene.mesh().num_vertices()
    };
    // 0.15 apart on x: separate at 0.1, welded at 0.2
    assert_eq!(build(0.1), 6);
    assert_eq!(build(0.2), 5);
}
