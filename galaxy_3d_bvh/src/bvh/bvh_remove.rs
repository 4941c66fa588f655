use super::bvh_node::{NodeIndex, INVALID_NODE};
use super::scene_bvh::SceneBvh;

impl SceneBvh {
    /// Detach leaf `node` and return it and its parent to the pool.
    ///
    /// The sibling takes the parent's place; ancestors are refit and their
    /// children re-sorted up to the root. No rotation is attempted. The
    /// object's back-reference is left to the caller.
    pub fn remove(&mut self, node: NodeIndex) {
        debug_assert!(self.pool.is_live(node), "removing dead node {}", node);
        debug_assert!(self.pool.get(node).is_leaf, "removing internal node {}", node);

        let parent = self.pool.get(node).parent;
        if parent == INVALID_NODE {
            debug_assert_eq!(self.root, node, "orphan leaf {} is not the root", node);
            self.root = INVALID_NODE;
            self.pool.release(node);
            return;
        }

        let sibling = self.pool.get(parent).other_child(node);
        let grandparent = self.pool.get(parent).parent;

        self.pool.get_mut(sibling).parent = grandparent;
        if grandparent == INVALID_NODE {
            self.root = sibling;
        } else {
            self.pool.get_mut(grandparent).replace_child(parent, sibling);

            let mut index = grandparent;
            while index != INVALID_NODE {
                self.refit(index);
                self.sort_children(index);
                index = self.pool.get(index).parent;
            }
        }

        self.pool.release(parent);
        self.pool.release(node);
    }
}

#[cfg(test)]
#[path = "bvh_remove_tests.rs"]
mod tests;
