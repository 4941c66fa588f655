use super::*;
use glam::{Mat4, Vec3};
use crate::bvh::ObjectStore;
use crate::scene::{Scene, SceneObjectKey, AABB};

fn scene_with_line(count: usize) -> (Scene, Vec<SceneObjectKey>) {
    let mut scene = Scene::new();
    let keys = (0..count)
        .map(|i| {
            let center = Vec3::new(i as f32 * 4.0, 0.0, 0.0);
            scene.create_object(AABB::from_center(center, Vec3::splat(0.5)), Mat4::IDENTITY)
        })
        .collect();
    (scene, keys)
}

fn built(count: usize) -> (Scene, Vec<SceneObjectKey>, SceneBvh) {
    let (mut scene, keys) = scene_with_line(count);
    let mut bvh = SceneBvh::new();
    bvh.build(&mut scene, &keys);
    (scene, keys, bvh)
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_remove_root_leaf_empties_tree() {
    let (_scene, _keys, mut bvh) = built(1);
    let root = bvh.root();
    bvh.remove(root);

    assert!(bvh.is_empty());
    assert_eq!(bvh.root(), INVALID_NODE);
    assert_eq!(bvh.free_count(), 1);
    assert!(bvh.check_invariants().is_ok());
}

#[test]
fn test_sibling_becomes_root() {
    let (scene, keys, mut bvh) = built(2);
    let survivor = scene.node_index(keys[1]);
    bvh.remove(scene.node_index(keys[0]));

    assert_eq!(bvh.root(), survivor);
    assert_eq!(bvh.node(survivor).unwrap().parent, INVALID_NODE);
    assert_eq!(bvh.leaf_count(), 1);
    assert_eq!(bvh.free_count(), 2);
    assert!(bvh.check_invariants().is_ok());
}

// ============================================================================
// Refit
// ============================================================================

#[test]
fn test_ancestors_shrink_after_remove() {
    let (mut scene, keys, mut bvh) = built(8);
    let root_before = bvh.node(bvh.root()).unwrap().aabb;

    // The rightmost object defines the root's max X
    assert!(bvh.remove_object(&mut scene, keys[7]));
    let root_after = bvh.node(bvh.root()).unwrap().aabb;

    assert!(root_after.max.x < root_before.max.x);
    assert_eq!(root_after.min, root_before.min);
    assert_eq!(scene.node_index(keys[7]), INVALID_NODE);
    assert_eq!(bvh.leaf_count(), 7);
    assert_eq!(bvh.internal_count(), 6);
    assert!(bvh.check_invariants().is_ok());
}

#[test]
fn test_remove_everything_one_by_one() {
    let (mut scene, keys, mut bvh) = built(12);
    for (removed, &key) in keys.iter().enumerate() {
        assert!(bvh.remove_object(&mut scene, key));
        assert_eq!(bvh.leaf_count(), 12 - removed - 1);
        assert!(bvh.check_invariants().is_ok());
    }
    assert!(bvh.is_empty());
    assert_eq!(bvh.free_count(), bvh.high_water_mark());
}

#[test]
fn test_remove_unindexed_object_is_noop() {
    let (mut scene, keys, mut bvh) = built(3);
    assert!(bvh.remove_object(&mut scene, keys[0]));
    assert!(!bvh.remove_object(&mut scene, keys[0]));
    assert_eq!(bvh.leaf_count(), 2);
}

// ============================================================================
// Slot recycling
// ============================================================================

#[test]
fn test_freed_slots_are_reused() {
    let (mut scene, keys, mut bvh) = built(6);
    let leaf = scene.node_index(keys[2]);
    let parent = bvh.node(leaf).unwrap().parent;
    let hwm = bvh.high_water_mark();

    bvh.remove_object(&mut scene, keys[2]);
    let new_leaf = bvh.insert_object(&mut scene, keys[2]).unwrap();

    // LIFO: the leaf slot comes back first, then its old parent's
    assert_eq!(new_leaf, leaf);
    assert!(bvh.is_live(parent));
    assert_eq!(bvh.high_water_mark(), hwm);
    assert_eq!(bvh.free_count(), 0);
    assert!(bvh.check_invariants().is_ok());
}
