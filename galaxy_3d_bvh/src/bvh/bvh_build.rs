//! Static SAH build of the scene BVH.
//!
//! Breadth-first over a work deque: entries are popped from the back and the
//! two halves of a split are pushed to the front, so siblings end up in
//! consecutive slots. Each entry carries its parent and the side it hangs on.

use std::collections::VecDeque;
use rustc_hash::FxHashSet;
use crate::scene::{AABB, SceneObjectKey};
use crate::{engine_debug, engine_warn};
use super::bvh_node::{separation_axis, BvhNode, NodeIndex, INVALID_NODE};
use super::bvh_split::{split_primitives_sah, Primitive};
use super::scene_bvh::{ObjectStore, SceneBvh};

struct BuildItem {
    indices: Vec<u32>,
    bounds: AABB,
    parent: NodeIndex,
    is_left: bool,
}

impl SceneBvh {
    /// Build the tree from scratch over `keys`, replacing any previous tree.
    ///
    /// Objects indexed by the previous tree get their back-reference reset
    /// first, so objects left out of `keys` end up unindexed. Writes every
    /// object's leaf back-reference and returns the root.
    /// Keys the store does not know and repeated keys are skipped.
    pub fn build<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        keys: &[SceneObjectKey],
    ) -> NodeIndex {
        debug_assert!(!keys.is_empty(), "building a scene BVH with no objects");
        self.release_back_references(store);
        self.clear();

        let mut seen = FxHashSet::default();
        let mut objects = Vec::with_capacity(keys.len());
        let mut prims = Vec::with_capacity(keys.len());
        for &key in keys {
            if !seen.insert(key) {
                continue;
            }
            let Some(world_aabb) = store.world_aabb(key) else {
                engine_warn!("galaxy3d::SceneBvh", "Build skips unknown object {:?}", key);
                continue;
            };
            prims.push(Primitive::new(self.leaf_aabb(&world_aabb), objects.len() as u32));
            objects.push(key);
        }

        if prims.is_empty() {
            engine_warn!("galaxy3d::SceneBvh", "Build called with no objects, tree is empty");
            return INVALID_NODE;
        }

        let bounds = prims.iter().fold(AABB::EMPTY, |acc, prim| acc.union(&prim.aabb));
        let mut queue = VecDeque::new();
        queue.push_back(BuildItem {
            indices: (0..prims.len() as u32).collect(),
            bounds,
            parent: INVALID_NODE,
            is_left: true,
        });

        while let Some(item) = queue.pop_back() {
            let split = split_primitives_sah(&prims, &item.indices, &item.bounds, &self.config.object_split);
            let index = self.pool.acquire();

            if split.is_leaf() {
                debug_assert_eq!(split.left_indices.len(), 1, "object leaf with several objects");
                let prim = &prims[split.left_indices[0] as usize];
                let key = objects[prim.id as usize];
                *self.pool.get_mut(index) = BvhNode::leaf(prim.aabb, key, item.parent);
                store.set_node_index(key, index);
            } else {
                let axis = separation_axis(&split.left_bounds, &split.right_bounds);
                let mut left = (split.left_indices, split.left_bounds);
                let mut right = (split.right_indices, split.right_bounds);
                if left.1.center()[axis as usize] > right.1.center()[axis as usize] {
                    std::mem::swap(&mut left, &mut right);
                }

                *self.pool.get_mut(index) =
                    BvhNode::internal(item.bounds, INVALID_NODE, INVALID_NODE, item.parent, axis);

                queue.push_front(BuildItem { indices: left.0, bounds: left.1, parent: index, is_left: true });
                queue.push_front(BuildItem { indices: right.0, bounds: right.1, parent: index, is_left: false });
            }

            if item.parent == INVALID_NODE {
                self.root = index;
            } else if item.is_left {
                self.pool.get_mut(item.parent).left_child = index;
            } else {
                self.pool.get_mut(item.parent).right_child = index;
            }
        }

        engine_debug!("galaxy3d::SceneBvh",
            "Built scene BVH: {} objects, {} nodes, depth {}",
            objects.len(), self.pool.len(), self.depth());

        self.root
    }

    /// Reset the back-reference of every object that points at one of our leaves
    fn release_back_references<S: ObjectStore + ?Sized>(&self, store: &mut S) {
        for (index, node) in self.pool.as_slice().iter().enumerate() {
            let index = index as NodeIndex;
            if self.pool.is_live(index) && node.is_leaf && store.node_index(node.object) == index {
                store.set_node_index(node.object, INVALID_NODE);
            }
        }
    }
}

#[cfg(test)]
#[path = "bvh_build_tests.rs"]
mod tests;
