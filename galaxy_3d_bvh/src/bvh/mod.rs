//! Bounding volume hierarchies
//!
//! - `SceneBvh`: dynamic tree over scene objects, one object per leaf,
//!   built once per scene load and maintained every tick
//! - `MeshBvh`: static tree over triangles with multi-primitive leaves
//!
//! Both use the SAH splitter in `bvh_split`.

mod bvh_node;
mod bvh_config;
mod bvh_split;
mod node_pool;
mod scene_bvh;
mod bvh_build;
mod bvh_insert;
mod bvh_remove;
mod bvh_validation;
mod mesh_bvh;

pub use bvh_node::{BvhNode, NodeIndex, INVALID_NODE, separation_axis};
pub use bvh_config::{BvhConfig, SplitSettings};
pub use bvh_split::{
    split_primitives_sah, Primitive, SplitResult, BINNING_THRESHOLD, BINS_COUNT,
};
pub use node_pool::NodePool;
pub use scene_bvh::{ObjectStore, SceneBvh, UpdateStats};
pub use mesh_bvh::{build_mesh_bvh, MeshBvh, MeshBvhNode, MeshBvhNodeKind};
