//! Dynamic scene BVH.
//!
//! One leaf per scene object. The tree is built once per scene load
//! (`build`) and then maintained incrementally every tick (`update`):
//! objects that left their leaf's fat box are detached and reinserted with a
//! branch-and-bound sibling search, and the path to the root is refit and
//! locally rotated. The whole tree is never rebuilt during maintenance.
//!
//! The BVH does not own scene objects. It reads world boxes and writes leaf
//! back-references through the [`ObjectStore`] trait.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use rustc_hash::FxHashSet;
use crate::error::Result;
use crate::scene::{AABB, SceneObjectKey};
use crate::{engine_trace, engine_warn};
use super::bvh_config::BvhConfig;
use super::bvh_insert::InsertCandidate;
use super::bvh_node::{BvhNode, NodeIndex, INVALID_NODE};
use super::node_pool::NodePool;

/// Access to the objects indexed by a [`SceneBvh`].
///
/// Implemented by [`Scene`](crate::scene::Scene); tests implement it over
/// plain maps.
pub trait ObjectStore {
    /// Current world-space box of `key`, `None` if the object does not exist
    fn world_aabb(&self, key: SceneObjectKey) -> Option<AABB>;

    /// Leaf back-reference of `key`, `INVALID_NODE` when not indexed
    fn node_index(&self, key: SceneObjectKey) -> NodeIndex;

    /// Store the leaf back-reference of `key`
    fn set_node_index(&mut self, key: SceneObjectKey, node: NodeIndex);
}

/// What one `update` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Objects detached (or never indexed) and inserted again
    pub reinserted: usize,
    /// Objects still inside their leaf box
    pub kept: usize,
    /// Rotations accepted while walking up after insertions
    pub rotations: usize,
}

/// Scene BVH over a node pool.
pub struct SceneBvh {
    pub(crate) config: BvhConfig,
    pub(crate) pool: NodePool,
    pub(crate) root: NodeIndex,
    /// Insertion search heap, reused between insertions
    pub(crate) candidates: BinaryHeap<Reverse<InsertCandidate>>,
    /// Objects waiting for reinsertion during `update`
    pending: Vec<SceneObjectKey>,
    /// Keys already handled by the current `update`
    seen: FxHashSet<SceneObjectKey>,
}

impl Default for SceneBvh {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBvh {
    /// Empty BVH with the default configuration
    pub fn new() -> Self {
        Self {
            config: BvhConfig::default(),
            pool: NodePool::new(),
            root: INVALID_NODE,
            candidates: BinaryHeap::new(),
            pending: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Empty BVH with a validated configuration
    pub fn with_config(config: BvhConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::new() })
    }

    /// Active configuration
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Root node, `INVALID_NODE` when the tree is empty
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Whether the tree holds no object
    pub fn is_empty(&self) -> bool {
        self.root == INVALID_NODE
    }

    /// The node array, free slots included (see [`SceneBvh::is_live`])
    pub fn nodes(&self) -> &[BvhNode] {
        self.pool.as_slice()
    }

    /// Node at `index`, `None` if out of range or on the free list
    pub fn node(&self, index: NodeIndex) -> Option<&BvhNode> {
        if self.pool.is_live(index) {
            Some(self.pool.get(index))
        } else {
            None
        }
    }

    /// Whether `index` refers to a node currently in use
    pub fn is_live(&self, index: NodeIndex) -> bool {
        self.pool.is_live(index)
    }

    /// Forget every node. Back-references held by the store are not touched.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.root = INVALID_NODE;
        self.candidates.clear();
        self.pending.clear();
        self.seen.clear();
    }

    /// Drop every node and release all memory held by the tree
    pub fn teardown(&mut self) {
        self.clear();
        self.pool.shrink_to_fit();
        self.candidates.shrink_to_fit();
        self.pending.shrink_to_fit();
        self.seen.shrink_to_fit();
    }

    /// Leaf box for an object: its world box grown by the bounds margin
    pub fn leaf_aabb(&self, world_aabb: &AABB) -> AABB {
        world_aabb.sanitized().expanded_by_fraction(self.config.bounds_margin)
    }

    /// Leaf of `key` in this tree.
    ///
    /// The store's back-reference is only trusted when it names a live leaf
    /// that holds `key`; anything else counts as not indexed.
    pub(crate) fn indexed_leaf<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        key: SceneObjectKey,
    ) -> Option<NodeIndex> {
        let node = store.node_index(key);
        if !self.pool.is_live(node) {
            return None;
        }
        let leaf = self.pool.get(node);
        (leaf.is_leaf && leaf.object == key).then_some(node)
    }

    /// Per-tick maintenance for the objects whose box changed.
    ///
    /// Objects still contained in their leaf box are left alone. The others
    /// are detached first, then all detached or never-indexed objects are
    /// reinserted. Keys unknown to the store are skipped. A key listed twice
    /// is processed once.
    pub fn update<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        changed: &[SceneObjectKey],
    ) -> UpdateStats {
        let mut stats = UpdateStats::default();
        let mut pending = std::mem::take(&mut self.pending);
        pending.clear();
        self.seen.clear();

        // Phase 1: containment test, detach what no longer fits
        for &key in changed {
            if !self.seen.insert(key) {
                continue;
            }
            let Some(world_aabb) = store.world_aabb(key) else {
                engine_warn!("galaxy3d::SceneBvh",
                    "Skipping update of unknown object {:?}", key);
                continue;
            };

            if let Some(node) = self.indexed_leaf(store, key) {
                if self.pool.get(node).aabb.contains(&world_aabb.sanitized()) {
                    stats.kept += 1;
                    continue;
                }
                self.remove(node);
            }
            store.set_node_index(key, INVALID_NODE);
            pending.push(key);
        }

        // Phase 2: reinsert
        for &key in &pending {
            let Some(world_aabb) = store.world_aabb(key) else {
                continue;
            };
            let leaf_aabb = self.leaf_aabb(&world_aabb);
            let (leaf, rotations) = self.insert_leaf(key, leaf_aabb);
            store.set_node_index(key, leaf);
            stats.reinserted += 1;
            stats.rotations += rotations;
        }

        self.pending = pending;

        if !changed.is_empty() {
            engine_trace!("galaxy3d::SceneBvh",
                "Update: {} changed, {} kept, {} reinserted, {} rotations",
                changed.len(), stats.kept, stats.reinserted, stats.rotations);
        }
        stats
    }

    /// Insert one object that is not indexed yet.
    ///
    /// Returns its leaf, or `None` if the store does not know the key or the
    /// object already has a leaf.
    pub fn insert_object<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        key: SceneObjectKey,
    ) -> Option<NodeIndex> {
        if self.indexed_leaf(store, key).is_some() {
            return None;
        }
        let world_aabb = store.world_aabb(key)?;
        let leaf_aabb = self.leaf_aabb(&world_aabb);
        let (leaf, _) = self.insert_leaf(key, leaf_aabb);
        store.set_node_index(key, leaf);
        Some(leaf)
    }

    /// Remove an object's leaf and clear its back-reference.
    ///
    /// Returns `false` if the object was not indexed.
    pub fn remove_object<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        key: SceneObjectKey,
    ) -> bool {
        let leaf = self.indexed_leaf(store, key);
        if let Some(node) = leaf {
            self.remove(node);
        }
        store.set_node_index(key, INVALID_NODE);
        leaf.is_some()
    }

    // ===== Diagnostics =====

    /// Number of leaves (indexed objects)
    pub fn leaf_count(&self) -> usize {
        self.live_nodes().filter(|node| node.is_leaf).count()
    }

    /// Number of internal nodes
    pub fn internal_count(&self) -> usize {
        self.live_nodes().filter(|node| !node.is_leaf).count()
    }

    /// Slots waiting on the free list
    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    /// Slots ever allocated (live + free)
    pub fn high_water_mark(&self) -> usize {
        self.pool.high_water_mark()
    }

    /// Sum of the surface areas of all internal nodes (SAH quality measure)
    pub fn total_surface_area(&self) -> f32 {
        self.live_nodes()
            .filter(|node| !node.is_leaf)
            .map(|node| node.aabb.surface_area())
            .sum()
    }

    /// Number of levels, 0 for an empty tree and 1 for a single leaf
    pub fn depth(&self) -> usize {
        if self.root == INVALID_NODE {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = self.pool.get(index);
            if !node.is_leaf {
                stack.push((node.left_child, depth + 1));
                stack.push((node.right_child, depth + 1));
            }
        }
        max_depth
    }

    /// Objects held by the leaves reachable from the root, left to right
    pub fn leaves(&self) -> Vec<SceneObjectKey> {
        let mut keys = Vec::new();
        if self.root == INVALID_NODE {
            return keys;
        }
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let node = self.pool.get(index);
            if node.is_leaf {
                keys.push(node.object);
            } else {
                stack.push(node.right_child);
                stack.push(node.left_child);
            }
        }
        keys
    }

    fn live_nodes(&self) -> impl Iterator<Item = &BvhNode> + '_ {
        self.pool
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.pool.is_live(*index as NodeIndex))
            .map(|(_, node)| node)
    }
}

#[cfg(test)]
#[path = "scene_bvh_tests.rs"]
mod tests;
