//! Leaf insertion: branch-and-bound sibling search, splice, then refit and
//! rotate on the way back to the root.

use std::cmp::{Ordering, Reverse};
use crate::scene::{AABB, SceneObjectKey};
use super::bvh_node::{separation_axis, BvhNode, NodeIndex, INVALID_NODE};
use super::scene_bvh::SceneBvh;

/// Search entry ordered by direct cost.
///
/// `inherited_cost` is the area its ancestors gain when they also enclose
/// the new leaf.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InsertCandidate {
    pub(crate) direct_cost: f32,
    pub(crate) inherited_cost: f32,
    pub(crate) node: NodeIndex,
}

impl PartialEq for InsertCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InsertCandidate {}

impl PartialOrd for InsertCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InsertCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.direct_cost
            .total_cmp(&other.direct_cost)
            .then(self.node.cmp(&other.node))
    }
}

impl SceneBvh {
    /// Insert a leaf for `object` with the already expanded box `leaf_aabb`.
    ///
    /// Returns the new leaf and the number of rotations performed.
    pub(crate) fn insert_leaf(&mut self, object: SceneObjectKey, leaf_aabb: AABB) -> (NodeIndex, usize) {
        let leaf = self.pool.acquire();
        *self.pool.get_mut(leaf) = BvhNode::leaf(leaf_aabb, object, INVALID_NODE);

        if self.root == INVALID_NODE {
            self.root = leaf;
            return (leaf, 0);
        }

        let sibling = self.find_best_sibling(&leaf_aabb);
        let old_parent = self.pool.get(sibling).parent;
        let sibling_aabb = self.pool.get(sibling).aabb;

        let parent = self.pool.acquire();
        *self.pool.get_mut(parent) = BvhNode::internal(
            sibling_aabb.union(&leaf_aabb),
            sibling,
            leaf,
            old_parent,
            separation_axis(&sibling_aabb, &leaf_aabb),
        );
        self.pool.get_mut(sibling).parent = parent;
        self.pool.get_mut(leaf).parent = parent;

        if old_parent == INVALID_NODE {
            self.root = parent;
        } else {
            self.pool.get_mut(old_parent).replace_child(sibling, parent);
        }

        let rotations = self.refit_and_rotate(parent);
        (leaf, rotations)
    }

    /// Best-first search for the node whose pairing with `leaf_aabb` adds
    /// the least surface area to the tree.
    fn find_best_sibling(&mut self, leaf_aabb: &AABB) -> NodeIndex {
        let leaf_area = leaf_aabb.surface_area();
        let root_cost = self.pool.get(self.root).aabb.union_area(leaf_aabb);

        let mut best_node = self.root;
        let mut best_cost = f32::INFINITY;

        self.candidates.clear();
        self.candidates.push(Reverse(InsertCandidate {
            direct_cost: root_cost,
            inherited_cost: 0.0,
            node: self.root,
        }));

        while let Some(Reverse(candidate)) = self.candidates.pop() {
            let node = *self.pool.get(candidate.node);

            let total_cost = candidate.direct_cost + candidate.inherited_cost;
            if total_cost < best_cost {
                best_cost = total_cost;
                best_node = candidate.node;
            }

            if node.is_leaf {
                continue;
            }

            // Any node below pays at least its own area plus what this
            // candidate and its ancestors gain.
            let area_gain = candidate.direct_cost - node.aabb.surface_area();
            let lower_bound = leaf_area + candidate.inherited_cost + area_gain;
            if lower_bound < best_cost {
                let inherited_cost = candidate.inherited_cost + area_gain;
                for child in [node.left_child, node.right_child] {
                    self.candidates.push(Reverse(InsertCandidate {
                        direct_cost: self.pool.get(child).aabb.union_area(leaf_aabb),
                        inherited_cost,
                        node: child,
                    }));
                }
            }
        }

        self.candidates.clear();
        best_node
    }

    /// Walk from `start` to the root: refit, rotate, re-sort.
    ///
    /// Returns the number of rotations accepted.
    pub(crate) fn refit_and_rotate(&mut self, start: NodeIndex) -> usize {
        let mut rotations = 0;
        let mut index = start;
        while index != INVALID_NODE {
            self.refit(index);
            if self.rotate_left_down(index) {
                rotations += 1;
            }
            if self.rotate_right_down(index) {
                rotations += 1;
            }
            self.sort_children(index);
            index = self.pool.get(index).parent;
        }
        rotations
    }

    /// Recompute an internal node's box from its children
    pub(crate) fn refit(&mut self, index: NodeIndex) {
        let node = self.pool.get(index);
        let aabb = self.pool.get(node.left_child).aabb.union(&self.pool.get(node.right_child).aabb);
        self.pool.get_mut(index).aabb = aabb;
    }

    /// Recompute the separation axis and order the children along it
    pub(crate) fn sort_children(&mut self, index: NodeIndex) {
        let node = *self.pool.get(index);
        let left = self.pool.get(node.left_child).aabb;
        let right = self.pool.get(node.right_child).aabb;
        let axis = separation_axis(&left, &right);

        let node = self.pool.get_mut(index);
        node.space_axis = axis;
        if left.center()[axis as usize] > right.center()[axis as usize] {
            std::mem::swap(&mut node.left_child, &mut node.right_child);
        }
    }

    /// Swap the left child with one of the right child's children when that
    /// shrinks the right child.
    fn rotate_left_down(&mut self, index: NodeIndex) -> bool {
        let node = *self.pool.get(index);
        let pivot = node.right_child;
        let (left, pivot_node) = (node.left_child, *self.pool.get(pivot));
        if pivot_node.is_leaf {
            return false;
        }
        self.try_rotation(index, left, pivot, &pivot_node)
    }

    /// Mirror of [`rotate_left_down`](Self::rotate_left_down)
    fn rotate_right_down(&mut self, index: NodeIndex) -> bool {
        let node = *self.pool.get(index);
        let pivot = node.left_child;
        let (right, pivot_node) = (node.right_child, *self.pool.get(pivot));
        if pivot_node.is_leaf {
            return false;
        }
        self.try_rotation(index, right, pivot, &pivot_node)
    }

    /// Exchange `outer` (a child of `index`) with the better grandchild under
    /// `pivot` (the other child of `index`), if that strictly reduces the
    /// pivot's surface area.
    fn try_rotation(&mut self, index: NodeIndex, outer: NodeIndex, pivot: NodeIndex, pivot_node: &BvhNode) -> bool {
        let outer_aabb = self.pool.get(outer).aabb;
        let cost_before = pivot_node.aabb.surface_area();

        // Moving a grandchild up leaves `outer` paired with the other one.
        let lift_left_cost = outer_aabb.union_area(&self.pool.get(pivot_node.right_child).aabb);
        let lift_right_cost = outer_aabb.union_area(&self.pool.get(pivot_node.left_child).aabb);
        let (lifted, cost_after) = if lift_left_cost < lift_right_cost {
            (pivot_node.left_child, lift_left_cost)
        } else {
            (pivot_node.right_child, lift_right_cost)
        };

        if cost_after >= cost_before {
            return false;
        }

        self.pool.get_mut(index).replace_child(outer, lifted);
        self.pool.get_mut(pivot).replace_child(lifted, outer);
        self.pool.get_mut(lifted).parent = index;
        self.pool.get_mut(outer).parent = pivot;

        self.refit(pivot);
        self.refit(index);
        self.sort_children(pivot);
        true
    }
}

#[cfg(test)]
#[path = "bvh_insert_tests.rs"]
mod tests;
