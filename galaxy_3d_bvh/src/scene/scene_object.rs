/// Scene object: the transform and bounding data the BVH indexes.
///
/// The BVH never owns objects. Each object carries a `node_index`
/// back-reference to its leaf, `INVALID_NODE` until it is inserted.

use glam::Mat4;
use slotmap::new_key_type;
use crate::bvh::{NodeIndex, INVALID_NODE};
use super::aabb::AABB;

new_key_type! {
    /// Stable key for a SceneObject within a Scene.
    ///
    /// Keys remain valid even after other objects are removed.
    pub struct SceneObjectKey;
}

/// A scene object as seen by the spatial index.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Bounding box in local space
    local_aabb: AABB,
    /// Object-to-world transform
    world_matrix: Mat4,
    /// Current world-space bounding box
    world_aabb: AABB,
    /// World-space bounding box before the last transform change
    prev_world_aabb: AABB,
    /// Leaf that currently indexes this object
    node_index: NodeIndex,
    /// Bounding box changed since the last tick
    changed: bool,
}

impl SceneObject {
    pub(crate) fn new(local_aabb: AABB, world_matrix: Mat4) -> Self {
        let world_aabb = local_aabb.sanitized().transformed(&world_matrix);
        Self {
            local_aabb,
            world_matrix,
            world_aabb,
            prev_world_aabb: world_aabb,
            node_index: INVALID_NODE,
            changed: false,
        }
    }

    /// Bounding box in local space
    pub fn local_aabb(&self) -> &AABB {
        &self.local_aabb
    }

    /// Object-to-world transform
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Current world-space bounding box
    pub fn world_aabb(&self) -> &AABB {
        &self.world_aabb
    }

    /// World-space bounding box before the last change
    pub fn prev_world_aabb(&self) -> &AABB {
        &self.prev_world_aabb
    }

    /// Leaf node index in the scene BVH, `INVALID_NODE` when not indexed
    pub fn node_index(&self) -> NodeIndex {
        self.node_index
    }

    /// Whether the bounding box changed since the last tick
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn set_node_index(&mut self, node_index: NodeIndex) {
        self.node_index = node_index;
    }

    pub(crate) fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    pub(crate) fn set_world_matrix(&mut self, matrix: Mat4) {
        self.world_matrix = matrix;
        self.refresh_world_aabb();
    }

    pub(crate) fn set_local_aabb(&mut self, local_aabb: AABB) {
        self.local_aabb = local_aabb;
        self.refresh_world_aabb();
    }

    fn refresh_world_aabb(&mut self) {
        self.prev_world_aabb = self.world_aabb;
        self.world_aabb = self.local_aabb.sanitized().transformed(&self.world_matrix);
    }
}
