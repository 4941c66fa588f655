use super::*;
use glam::{Mat4, Vec3};
use slotmap::Key;
use crate::bvh::SplitSettings;
use crate::error::Error;
use crate::scene::Scene;

fn add_cube(scene: &mut Scene, center: Vec3) -> SceneObjectKey {
    scene.create_object(AABB::from_center(center, Vec3::splat(0.5)), Mat4::IDENTITY)
}

fn grid(scene: &mut Scene, side: usize, spacing: f32) -> Vec<SceneObjectKey> {
    let mut keys = Vec::new();
    for x in 0..side {
        for z in 0..side {
            keys.push(add_cube(scene, Vec3::new(x as f32 * spacing, 0.0, z as f32 * spacing)));
        }
    }
    keys
}

fn move_to(scene: &mut Scene, key: SceneObjectKey, to: Vec3) {
    let from = scene.object(key).unwrap().local_aabb().center();
    scene.set_world_matrix(key, Mat4::from_translation(to - from));
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_is_empty() {
    let bvh = SceneBvh::new();
    assert!(bvh.is_empty());
    assert_eq!(bvh.root(), INVALID_NODE);
    assert!(bvh.nodes().is_empty());
    assert_eq!(bvh.depth(), 0);
    assert!(bvh.leaves().is_empty());
    assert_eq!(bvh.config(), &BvhConfig::default());
}

#[test]
fn test_with_config_validates() {
    let config = BvhConfig { bounds_margin: 0.5, ..BvhConfig::default() };
    assert_eq!(SceneBvh::with_config(config).unwrap().config().bounds_margin, 0.5);

    let bad = BvhConfig { object_split: SplitSettings::default(), ..BvhConfig::default() };
    assert!(matches!(SceneBvh::with_config(bad), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_leaf_aabb_uses_margin() {
    let bvh = SceneBvh::with_config(BvhConfig { bounds_margin: 0.5, ..BvhConfig::default() }).unwrap();
    let leaf = bvh.leaf_aabb(&AABB::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 0.0)));
    assert_eq!(leaf.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(leaf.max, Vec3::new(3.0, 6.0, 0.0));
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_small_move_keeps_leaf() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 4, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);
    let leaf = scene.node_index(keys[5]);
    let nodes_before = bvh.nodes().to_vec();

    // 0.1 is inside the 0.2 margin of a unit cube
    let center = scene.object(keys[5]).unwrap().world_aabb().center();
    move_to(&mut scene, keys[5], center + Vec3::new(0.1, 0.0, -0.1));
    let stats = bvh.update(&mut scene, &[keys[5]]);

    assert_eq!(stats, UpdateStats { reinserted: 0, kept: 1, rotations: 0 });
    assert_eq!(scene.node_index(keys[5]), leaf);
    assert_eq!(bvh.nodes(), nodes_before.as_slice());
}

#[test]
fn test_large_move_reinserts() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 4, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    move_to(&mut scene, keys[0], Vec3::new(300.0, 0.0, 300.0));
    let stats = bvh.update(&mut scene, &[keys[0]]);

    assert_eq!(stats.reinserted, 1);
    assert_eq!(stats.kept, 0);
    assert_eq!(bvh.leaf_count(), 16);
    assert!(bvh.check_invariants().is_ok());
    assert!(bvh.check_back_references(&scene).is_ok());
}

#[test]
fn test_update_inserts_new_objects() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    let newcomer = add_cube(&mut scene, Vec3::new(-20.0, 0.0, 0.0));
    let stats = bvh.update(&mut scene, &[newcomer]);

    assert_eq!(stats.reinserted, 1);
    assert_ne!(scene.node_index(newcomer), INVALID_NODE);
    assert_eq!(bvh.leaf_count(), 10);
    assert!(bvh.check_invariants().is_ok());
}

#[test]
fn test_update_on_empty_tree_creates_root_leaf() {
    let mut scene = Scene::new();
    let key = add_cube(&mut scene, Vec3::ZERO);
    let mut bvh = SceneBvh::new();

    bvh.update(&mut scene, &[key]);
    assert_eq!(bvh.root(), scene.node_index(key));
    assert_eq!(bvh.internal_count(), 0);
}

#[test]
fn test_duplicate_and_unknown_keys() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    move_to(&mut scene, keys[4], Vec3::new(0.0, 80.0, 0.0));
    let stats = bvh.update(&mut scene, &[keys[4], SceneObjectKey::null(), keys[4]]);

    assert_eq!(stats.reinserted, 1);
    assert_eq!(bvh.leaf_count(), 9);
    assert!(bvh.check_invariants().is_ok());
}

#[test]
fn test_duplicate_kept_key_counted_once() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    let center = scene.object(keys[2]).unwrap().world_aabb().center();
    move_to(&mut scene, keys[2], center + Vec3::X * 0.05);
    let stats = bvh.update(&mut scene, &[keys[2], keys[2]]);

    assert_eq!(stats, UpdateStats { reinserted: 0, kept: 1, rotations: 0 });
}

#[test]
fn test_stale_back_reference_is_ignored() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys[1..]);

    // keys[0] claims the live leaf of keys[1]
    let other_leaf = scene.node_index(keys[1]);
    scene.set_node_index(keys[0], other_leaf);
    assert!(!bvh.remove_object(&mut scene, keys[0]));
    assert_eq!(scene.node_index(keys[0]), INVALID_NODE);
    assert_eq!(scene.node_index(keys[1]), other_leaf);

    scene.set_node_index(keys[0], other_leaf);
    move_to(&mut scene, keys[0], Vec3::new(0.0, 40.0, 0.0));
    let stats = bvh.update(&mut scene, &[keys[0]]);

    assert_eq!(stats.reinserted, 1);
    assert_eq!(bvh.leaf_count(), 9);
    assert_eq!(scene.node_index(keys[1]), other_leaf);
    assert_eq!(bvh.node(other_leaf).unwrap().object, keys[1]);
    assert!(bvh.check_invariants().is_ok());
    assert!(bvh.check_back_references(&scene).is_ok());
}

#[test]
fn test_empty_update_is_noop() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);
    let before = bvh.nodes().to_vec();

    assert_eq!(bvh.update(&mut scene, &[]), UpdateStats::default());
    assert_eq!(bvh.nodes(), before.as_slice());
}

#[test]
fn test_insert_and_remove_object() {
    let mut scene = Scene::new();
    let a = add_cube(&mut scene, Vec3::ZERO);
    let b = add_cube(&mut scene, Vec3::X * 10.0);
    let mut bvh = SceneBvh::new();

    assert!(bvh.insert_object(&mut scene, a).is_some());
    assert!(bvh.insert_object(&mut scene, b).is_some());
    assert!(bvh.insert_object(&mut scene, SceneObjectKey::null()).is_none());
    assert_eq!(bvh.leaves(), vec![a, b]);

    assert!(bvh.remove_object(&mut scene, a));
    assert_eq!(bvh.leaves(), vec![b]);
    assert!(!bvh.remove_object(&mut scene, a));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_depth_and_area() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 4, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    // 16 objects, balanced by the median-like SAH split on a regular grid
    assert_eq!(bvh.depth(), 5);
    let root_area = bvh.node(bvh.root()).unwrap().aabb.surface_area();
    assert!(bvh.total_surface_area() > root_area);
}

#[test]
fn test_leaves_match_objects() {
    let mut scene = Scene::new();
    let mut keys = grid(&mut scene, 5, 2.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    let mut leaves = bvh.leaves();
    leaves.sort();
    keys.sort();
    assert_eq!(leaves, keys);
}

#[test]
fn test_clear_and_teardown() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 3, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    bvh.clear();
    assert!(bvh.is_empty());
    assert_eq!(bvh.high_water_mark(), 0);

    bvh.build(&mut scene, &keys);
    bvh.teardown();
    assert!(bvh.is_empty());
    assert!(bvh.check_invariants().is_ok());
}

#[test]
fn test_node_lookup_rejects_free_slots() {
    let mut scene = Scene::new();
    let keys = grid(&mut scene, 2, 5.0);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);

    let leaf = scene.node_index(keys[0]);
    bvh.remove_object(&mut scene, keys[0]);
    assert!(bvh.node(leaf).is_none());
    assert!(!bvh.is_live(leaf));
    assert!(bvh.node(INVALID_NODE).is_none());
}
