/*!
# Galaxy 3D BVH

Dynamic bounding volume hierarchy for Galaxy 3D scenes.

The scene BVH is built once per scene load with a surface area heuristic
(SAH) and then maintained incrementally every tick: objects that leave their
leaf box are detached and reinserted with a branch-and-bound sibling search,
and the path to the root is refit and rotated. The tree is never rebuilt
during maintenance.

## Architecture

- **Scene**: object store (local box, world matrix, world box, leaf back-reference)
- **SceneBvh**: node pool, static build, incremental update, removal
- **SceneManager**: owns a scene and its BVH, runs `load` and per-tick `update`
- **MeshBvh**: static SAH tree over triangles, sharing the same splitter

## Example

```no_run
use galaxy_3d_bvh::galaxy3d::{bvh::BvhConfig, scene::{SceneManager, AABB}};
use galaxy_3d_bvh::glam::{Mat4, Vec3};

let mut manager = SceneManager::new(BvhConfig::default())?;
let unit = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));
let key = manager.scene_mut().create_object(unit, Mat4::IDENTITY);
manager.load();

manager.scene_mut().set_world_matrix(key, Mat4::from_translation(Vec3::X * 100.0));
let stats = manager.update();
assert_eq!(stats.reinserted, 1);
# Ok::<(), galaxy_3d_bvh::galaxy3d::Error>(())
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod bvh;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging front door
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // BVH sub-module
    pub mod bvh {
        pub use crate::bvh::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
