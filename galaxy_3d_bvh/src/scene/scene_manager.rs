//! Central scene manager.
//!
//! Owns a [`Scene`] and the [`SceneBvh`] that indexes it, and drives the BVH
//! through its two entry points: `load` (static build) and `update` (per-tick
//! maintenance).

use crate::bvh::{BvhConfig, SceneBvh, UpdateStats};
use crate::error::Result;
use crate::{engine_debug, engine_err};
use super::scene::Scene;
use super::scene_object::SceneObjectKey;

pub struct SceneManager {
    scene: Scene,
    bvh: SceneBvh,
    tick_count: u64,
}

impl SceneManager {
    /// Create an empty scene manager. Fails if `config` is invalid.
    pub fn new(config: BvhConfig) -> Result<Self> {
        let bvh = SceneBvh::with_config(config).map_err(|e| {
            engine_err!(InitializationFailed, "galaxy3d::SceneManager",
                "Cannot create scene BVH: {}", e)
        })?;
        Ok(Self {
            scene: Scene::new(),
            bvh,
            tick_count: 0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn bvh(&self) -> &SceneBvh {
        &self.bvh
    }

    /// Rebuild the BVH from every object in the scene.
    ///
    /// Pending removals are committed first; pending changes are dropped
    /// since the build already sees the current boxes.
    pub fn load(&mut self) {
        let removed = self.scene.take_removed_objects();
        self.scene.commit_removals(&removed);
        self.scene.reset_tracking();

        let keys: Vec<SceneObjectKey> = self.scene.object_keys().collect();
        if keys.is_empty() {
            self.bvh.clear();
        } else {
            self.bvh.build(&mut self.scene, &keys);
        }

        engine_debug!("galaxy3d::SceneManager", "Scene loaded: {} objects", keys.len());
    }

    /// Run one tick of BVH maintenance.
    ///
    /// Phase 0 removes the leaves of objects marked for removal and deletes
    /// them from the scene; phase 1 updates the BVH for the changed objects.
    pub fn update(&mut self) -> UpdateStats {
        let removed = self.scene.take_removed_objects();
        for &key in &removed {
            self.bvh.remove_object(&mut self.scene, key);
        }
        self.scene.commit_removals(&removed);

        let changed = self.scene.take_changed_objects();
        let stats = self.bvh.update(&mut self.scene, &changed);

        self.tick_count += 1;
        stats
    }

    /// Delete an object and its leaf immediately
    pub fn destroy_object(&mut self, key: SceneObjectKey) -> Result<()> {
        if self.scene.object(key).is_none() {
            return Err(engine_err!(InvalidObject, "galaxy3d::SceneManager",
                "Cannot destroy unknown object {:?}", key));
        }
        self.bvh.remove_object(&mut self.scene, key);
        self.scene.delete_object(key);
        Ok(())
    }

    /// Remove every object and empty the BVH
    pub fn clear(&mut self) {
        self.scene.clear();
        self.bvh.clear();
    }

    /// Number of `update` calls so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
