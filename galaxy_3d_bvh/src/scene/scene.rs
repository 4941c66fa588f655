/// Scene: the object store indexed by the scene BVH.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys.
/// Objects are stored contiguously for cache-friendly iteration.

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use glam::Mat4;
use crate::bvh::{NodeIndex, ObjectStore, INVALID_NODE};
use super::aabb::AABB;
use super::scene_object::{SceneObject, SceneObjectKey};

/// A collection of scene objects.
///
/// Objects are managed via stable keys (SceneObjectKey).
/// Keys remain valid even after other objects are removed.
#[derive(Default)]
pub struct Scene {
    /// Objects stored in a slot map for O(1) insert/remove
    objects: SlotMap<SceneObjectKey, SceneObject>,
    /// Objects whose bounding box changed since the last take, in first-change order
    changed_objects: Vec<SceneObjectKey>,
    /// Objects marked for deferred removal (processed by SceneManager::update)
    removed_objects: FxHashSet<SceneObjectKey>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and queue it for insertion into the BVH.
    ///
    /// # Arguments
    ///
    /// * `local_aabb` - Bounding box in local space
    /// * `world_matrix` - Object-to-world transform
    pub fn create_object(&mut self, local_aabb: AABB, world_matrix: Mat4) -> SceneObjectKey {
        let key = self.objects.insert(SceneObject::new(local_aabb, world_matrix));
        self.mark_changed(key);
        key
    }

    /// Get an object by key
    pub fn object(&self, key: SceneObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Set the world matrix of an object. Returns false if key is invalid.
    pub fn set_world_matrix(&mut self, key: SceneObjectKey, matrix: Mat4) -> bool {
        if let Some(object) = self.objects.get_mut(key) {
            object.set_world_matrix(matrix);
            self.mark_changed(key);
            true
        } else {
            false
        }
    }

    /// Set the local bounding box of an object. Returns false if key is invalid.
    pub fn set_local_aabb(&mut self, key: SceneObjectKey, local_aabb: AABB) -> bool {
        if let Some(object) = self.objects.get_mut(key) {
            object.set_local_aabb(local_aabb);
            self.mark_changed(key);
            true
        } else {
            false
        }
    }

    /// Mark an object for deferred removal.
    ///
    /// The object stays in the scene until the next `SceneManager::update`
    /// (via `take_removed_objects` + `commit_removals`).
    /// Returns false if the key is invalid.
    pub fn remove_object(&mut self, key: SceneObjectKey) -> bool {
        if self.objects.contains_key(key) {
            self.removed_objects.insert(key);
            true
        } else {
            false
        }
    }

    /// Objects with pending bounding box changes
    pub fn changed_objects(&self) -> &[SceneObjectKey] {
        &self.changed_objects
    }

    /// Take and clear the changed list, resetting each object's changed flag.
    ///
    /// Objects pending removal are left out.
    pub fn take_changed_objects(&mut self) -> Vec<SceneObjectKey> {
        let mut keys = std::mem::take(&mut self.changed_objects);
        for &key in &keys {
            if let Some(object) = self.objects.get_mut(key) {
                object.set_changed(false);
            }
        }
        keys.retain(|key| self.objects.contains_key(*key) && !self.removed_objects.contains(key));
        keys
    }

    /// Take and clear the set of objects marked for removal.
    pub fn take_removed_objects(&mut self) -> FxHashSet<SceneObjectKey> {
        std::mem::take(&mut self.removed_objects)
    }

    /// Objects marked for removal, not yet committed
    pub fn removed_objects(&self) -> &FxHashSet<SceneObjectKey> {
        &self.removed_objects
    }

    /// Actually remove objects from the SlotMap.
    ///
    /// Called by the SceneManager after the BVH leaves are gone.
    pub(crate) fn commit_removals(&mut self, keys: &FxHashSet<SceneObjectKey>) {
        for &key in keys {
            self.objects.remove(key);
        }
        self.changed_objects.retain(|key| !keys.contains(key));
    }

    /// Delete an object right away. Its BVH leaf must already be removed.
    pub(crate) fn delete_object(&mut self, key: SceneObjectKey) -> Option<SceneObject> {
        self.removed_objects.remove(&key);
        self.changed_objects.retain(|&changed| changed != key);
        self.objects.remove(key)
    }

    /// Iterate over all objects (key, object)
    pub fn objects(&self) -> impl Iterator<Item = (SceneObjectKey, &SceneObject)> {
        self.objects.iter()
    }

    /// Iterate over all object keys
    pub fn object_keys(&self) -> impl Iterator<Item = SceneObjectKey> + '_ {
        self.objects.keys()
    }

    /// Get the number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Remove all objects and pending changes
    pub fn clear(&mut self) {
        self.objects.clear();
        self.changed_objects.clear();
        self.removed_objects.clear();
    }

    /// Forget every object's changed flag and leaf back-reference
    pub(crate) fn reset_tracking(&mut self) {
        for (_, object) in self.objects.iter_mut() {
            object.set_changed(false);
            object.set_node_index(INVALID_NODE);
        }
        self.changed_objects.clear();
    }

    fn mark_changed(&mut self, key: SceneObjectKey) {
        if let Some(object) = self.objects.get_mut(key) {
            if !object.is_changed() {
                object.set_changed(true);
                self.changed_objects.push(key);
            }
        }
    }
}

impl ObjectStore for Scene {
    fn world_aabb(&self, key: SceneObjectKey) -> Option<AABB> {
        self.objects.get(key).map(|object| *object.world_aabb())
    }

    fn node_index(&self, key: SceneObjectKey) -> NodeIndex {
        self.objects.get(key).map_or(INVALID_NODE, |object| object.node_index())
    }

    fn set_node_index(&mut self, key: SceneObjectKey, node: NodeIndex) {
        if let Some(object) = self.objects.get_mut(key) {
            object.set_node_index(node);
        }
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
