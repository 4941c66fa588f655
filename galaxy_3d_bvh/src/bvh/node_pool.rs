//! Arena of BVH nodes with a free-index stack.
//!
//! Nodes are addressed by `NodeIndex`; released slots are recycled LIFO.
//! The backing `Vec` grows geometrically and slots are never moved, so an
//! index handed out by `acquire` stays valid until it is released.
//!
//! # Example
//!
//! ```ignore
//! let mut pool = NodePool::new();
//! let a = pool.acquire();  // 0
//! let b = pool.acquire();  // 1
//! pool.release(a);         // 0 is now free
//! let c = pool.acquire();  // 0 (recycled)
//! ```

use super::bvh_node::{BvhNode, NodeIndex};

/// Flat node storage plus free-index stack.
#[derive(Debug, Clone, Default)]
pub struct NodePool {
    nodes: Vec<BvhNode>,
    free_list: Vec<NodeIndex>,
    /// `true` for slots currently on the free list
    free_flags: Vec<bool>,
}

impl NodePool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            free_flags: Vec::with_capacity(capacity),
        }
    }

    /// Take a slot: pops the free stack, or appends a fresh node.
    ///
    /// The returned slot holds a default (unlinked) node.
    pub fn acquire(&mut self) -> NodeIndex {
        match self.free_list.pop() {
            Some(index) => {
                self.free_flags[index as usize] = false;
                self.nodes[index as usize] = BvhNode::default();
                index
            }
            None => {
                let index = self.nodes.len() as NodeIndex;
                self.nodes.push(BvhNode::default());
                self.free_flags.push(false);
                index
            }
        }
    }

    /// Return a slot to the free stack.
    ///
    /// The caller must already have unlinked the node from the tree.
    pub fn release(&mut self, index: NodeIndex) {
        debug_assert!(
            (index as usize) < self.nodes.len(),
            "releasing an unallocated node: {}", index
        );
        debug_assert!(
            !self.free_flags[index as usize],
            "releasing node {} twice", index
        );
        self.free_flags[index as usize] = true;
        self.free_list.push(index);
    }

    /// Whether `index` is currently handed out
    #[inline]
    pub fn is_live(&self, index: NodeIndex) -> bool {
        (index as usize) < self.nodes.len() && !self.free_flags[index as usize]
    }

    /// Node at `index` (live or free)
    #[inline]
    pub fn get(&self, index: NodeIndex) -> &BvhNode {
        &self.nodes[index as usize]
    }

    /// Mutable node at `index`
    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> &mut BvhNode {
        &mut self.nodes[index as usize]
    }

    /// The whole backing array, free slots included
    pub fn as_slice(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Free indices, in release order
    pub fn free_indices(&self) -> &[NodeIndex] {
        &self.free_list
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Whether no node is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots on the free stack
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Total number of slots ever allocated (live + free)
    pub fn high_water_mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node and free slot; all indices become invalid
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.free_flags.clear();
    }

    /// Release spare capacity
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.free_list.shrink_to_fit();
        self.free_flags.shrink_to_fit();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "node_pool_tests.rs"]
mod tests;
