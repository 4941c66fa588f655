//! Structural checks of the scene BVH.
//!
//! Too slow for every tick; meant for tests, debug builds and tooling.

use rustc_hash::FxHashSet;
use crate::engine_err;
use crate::error::Result;
use slotmap::Key;
use super::bvh_node::{NodeIndex, INVALID_NODE};
use super::scene_bvh::{ObjectStore, SceneBvh};

const SOURCE: &str = "galaxy3d::SceneBvh";

impl SceneBvh {
    /// Verify the tree structure.
    ///
    /// Checks that every internal node's box is exactly the union of its
    /// children's boxes, that leaves and internal nodes are in the right
    /// proportion, that parent links match child links, that children are
    /// ordered along `space_axis`, and that every live node is reachable
    /// from the root while no free slot is.
    pub fn check_invariants(&self) -> Result<()> {
        if self.root == INVALID_NODE {
            if !self.pool.is_empty() {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "empty tree still has {} live nodes", self.pool.len()));
            }
            return Ok(());
        }

        if !self.pool.is_live(self.root) {
            return Err(engine_err!(CorruptedTree, SOURCE, "root {} is not live", self.root));
        }
        if self.pool.get(self.root).parent != INVALID_NODE {
            return Err(engine_err!(CorruptedTree, SOURCE,
                "root {} has parent {}", self.root, self.pool.get(self.root).parent));
        }

        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut leaves = 0usize;
        let mut internals = 0usize;
        let mut stack = vec![self.root];

        while let Some(index) = stack.pop() {
            if !self.pool.is_live(index) {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "node {} is reachable but free", index));
            }
            if !visited.insert(index) {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "node {} is reachable twice", index));
            }

            let node = self.pool.get(index);
            if node.is_leaf {
                if node.object.is_null() {
                    return Err(engine_err!(CorruptedTree, SOURCE, "leaf {} has no object", index));
                }
                leaves += 1;
                continue;
            }

            internals += 1;
            for child in [node.left_child, node.right_child] {
                if !self.pool.is_live(child) {
                    return Err(engine_err!(CorruptedTree, SOURCE,
                        "node {} links dead child {}", index, child));
                }
                if self.pool.get(child).parent != index {
                    return Err(engine_err!(CorruptedTree, SOURCE,
                        "child {} of node {} points at parent {}",
                        child, index, self.pool.get(child).parent));
                }
                stack.push(child);
            }

            let left = &self.pool.get(node.left_child).aabb;
            let right = &self.pool.get(node.right_child).aabb;
            if node.aabb != left.union(right) {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "box of node {} is not the union of its children", index));
            }

            let axis = node.space_axis as usize;
            if axis > 2 || left.center()[axis] > right.center()[axis] {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "children of node {} are not ordered along axis {}", index, node.space_axis));
            }
        }

        if internals + 1 != leaves {
            return Err(engine_err!(CorruptedTree, SOURCE,
                "{} leaves but {} internal nodes", leaves, internals));
        }
        if visited.len() != self.pool.len() {
            return Err(engine_err!(CorruptedTree, SOURCE,
                "{} live nodes but only {} reachable", self.pool.len(), visited.len()));
        }

        Ok(())
    }

    /// Verify that every leaf's object points back at that leaf and that its
    /// current world box is inside the leaf box.
    pub fn check_back_references<S: ObjectStore + ?Sized>(&self, store: &S) -> Result<()> {
        for (index, node) in self.pool.as_slice().iter().enumerate() {
            let index = index as NodeIndex;
            if !self.pool.is_live(index) || !node.is_leaf {
                continue;
            }
            let back = store.node_index(node.object);
            if back != index {
                return Err(engine_err!(CorruptedTree, SOURCE,
                    "leaf {} holds {:?} which points at node {}", index, node.object, back));
            }
            match store.world_aabb(node.object) {
                Some(world_aabb) if node.aabb.contains(&world_aabb.sanitized()) => {}
                Some(_) => {
                    return Err(engine_err!(CorruptedTree, SOURCE,
                        "object {:?} is outside its leaf {}", node.object, index));
                }
                None => {
                    return Err(engine_err!(CorruptedTree, SOURCE,
                        "leaf {} holds unknown object {:?}", index, node.object));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "bvh_validation_tests.rs"]
mod tests;
