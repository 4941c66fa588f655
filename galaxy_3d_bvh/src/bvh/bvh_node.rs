use slotmap::Key;
use crate::scene::{AABB, SceneObjectKey};

/// Index of a node in the BVH node array.
///
/// Nodes refer to each other by index only, so growing the array never
/// invalidates a link.
pub type NodeIndex = u32;

/// "No node": the parent of the root, the root of an empty tree, and the
/// back-reference of an object that is not indexed.
pub const INVALID_NODE: NodeIndex = u32::MAX;

/// A node of the scene BVH.
///
/// Leaves hold exactly one scene object; internal nodes hold exactly two
/// children whose boxes union to this node's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// World-space box (margin-expanded for leaves)
    pub aabb: AABB,
    /// Leaf nodes reference an object, internal nodes reference two children
    pub is_leaf: bool,
    /// Left child (internal nodes only)
    pub left_child: NodeIndex,
    /// Right child (internal nodes only)
    pub right_child: NodeIndex,
    /// Parent node, `INVALID_NODE` for the root
    pub parent: NodeIndex,
    /// Owning scene object (leaves only)
    pub object: SceneObjectKey,
    /// Axis (0, 1, 2) with the largest distance between the children's centers
    pub space_axis: u32,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            aabb: AABB::EMPTY,
            is_leaf: false,
            left_child: INVALID_NODE,
            right_child: INVALID_NODE,
            parent: INVALID_NODE,
            object: SceneObjectKey::null(),
            space_axis: 0,
        }
    }
}

impl BvhNode {
    /// Leaf node for `object` with the given (already expanded) box
    pub fn leaf(aabb: AABB, object: SceneObjectKey, parent: NodeIndex) -> Self {
        Self {
            aabb,
            is_leaf: true,
            parent,
            object,
            ..Self::default()
        }
    }

    /// Internal node linking two children
    pub fn internal(
        aabb: AABB,
        left_child: NodeIndex,
        right_child: NodeIndex,
        parent: NodeIndex,
        space_axis: u32,
    ) -> Self {
        Self {
            aabb,
            is_leaf: false,
            left_child,
            right_child,
            parent,
            space_axis,
            ..Self::default()
        }
    }

    /// The child that is not `child`
    #[inline]
    pub fn other_child(&self, child: NodeIndex) -> NodeIndex {
        if self.left_child == child {
            self.right_child
        } else {
            self.left_child
        }
    }

    /// Replace the link to `old` with `new` (internal nodes only)
    #[inline]
    pub(crate) fn replace_child(&mut self, old: NodeIndex, new: NodeIndex) {
        if self.left_child == old {
            self.left_child = new;
        } else {
            debug_assert_eq!(self.right_child, old, "{} is not a child", old);
            self.right_child = new;
        }
    }
}

/// Dominant separation axis between two boxes' centers.
///
/// Exact ties fall through to Z.
pub fn separation_axis(left: &AABB, right: &AABB) -> u32 {
    let dist = (left.center() - right.center()).abs();
    if dist.x > dist.y && dist.x > dist.z {
        0
    } else if dist.y > dist.x && dist.y > dist.z {
        1
    } else {
        2
    }
}
