//! Scene module
//!
//! Provides the object store indexed by the scene BVH and the manager that
//! ties them together.

mod aabb;
mod scene;
mod scene_object;
mod scene_manager;

pub use aabb::AABB;
pub use scene::Scene;
pub use scene_object::{SceneObject, SceneObjectKey};
pub use scene_manager::SceneManager;
