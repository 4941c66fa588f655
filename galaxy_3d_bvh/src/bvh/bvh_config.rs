/// BVH configuration: leaf margin and SAH split settings.

use crate::error::Result;
use crate::engine_err;

/// Settings for the SAH primitive splitter.
///
/// `Default` is tuned for triangle meshes (several primitives per leaf);
/// [`SplitSettings::objects`] is the one-object-per-leaf variant used by the
/// scene BVH.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSettings {
    /// Refuse splits whose cost is not below `threshold * primitive_count`.
    ///
    /// `None` never refuses a split; inputs larger than
    /// `min_primitives_in_leaf` are then always divided.
    pub oversplit_threshold: Option<f32>,
    /// Constant cost added to every split candidate
    pub node_traversal_cost: f32,
    /// Inputs with this many primitives or fewer become leaves
    pub min_primitives_in_leaf: usize,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            oversplit_threshold: Some(0.95),
            node_traversal_cost: 0.025,
            min_primitives_in_leaf: 8,
        }
    }
}

impl SplitSettings {
    /// Settings for scene objects: always split, exactly one object per leaf
    pub fn objects() -> Self {
        Self {
            oversplit_threshold: None,
            node_traversal_cost: 0.0,
            min_primitives_in_leaf: 1,
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.oversplit_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(engine_err!(InvalidConfig, "galaxy3d::SplitSettings",
                    "oversplit_threshold must be finite and > 0 (got {})", threshold));
            }
        }
        if !self.node_traversal_cost.is_finite() || self.node_traversal_cost < 0.0 {
            return Err(engine_err!(InvalidConfig, "galaxy3d::SplitSettings",
                "node_traversal_cost must be finite and >= 0 (got {})", self.node_traversal_cost));
        }
        if self.min_primitives_in_leaf == 0 {
            return Err(engine_err!(InvalidConfig, "galaxy3d::SplitSettings",
                "min_primitives_in_leaf must be >= 1"));
        }
        Ok(())
    }
}

/// Scene BVH configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhConfig {
    /// Leaf boxes are the object box grown by this fraction of its extent
    pub bounds_margin: f32,
    /// Splitter settings for the static build
    pub object_split: SplitSettings,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            bounds_margin: 0.2,
            object_split: SplitSettings::objects(),
        }
    }
}

impl BvhConfig {
    /// Check that every value is usable by the scene BVH
    pub fn validate(&self) -> Result<()> {
        if !self.bounds_margin.is_finite() || self.bounds_margin < 0.0 {
            return Err(engine_err!(InvalidConfig, "galaxy3d::BvhConfig",
                "bounds_margin must be finite and >= 0 (got {})", self.bounds_margin));
        }
        self.object_split.validate()?;
        if self.object_split.min_primitives_in_leaf != 1
            || self.object_split.oversplit_threshold.is_some()
        {
            return Err(engine_err!(InvalidConfig, "galaxy3d::BvhConfig",
                "object_split must produce one object per leaf \
                 (min_primitives_in_leaf = 1, no oversplit_threshold)"));
        }
        Ok(())
    }
}
