/// Axis-aligned bounding box used by the scene store and the BVH.
///
/// Boxes are assumed finite. Inverted boxes (min > max on some axis) are not
/// rejected: `sanitized()` collapses them to zero extent on that axis so a bad
/// input cannot destabilize the tree mid-rebalance.

use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Box that is the identity for `union` (min = +MAX, max = -MAX).
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Create a box from its two corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of half-size `half_extent` around `center`
    pub fn from_center(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Smallest box enclosing both boxes
    #[inline]
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow this box in place to enclose `other`
    #[inline]
    pub fn grow(&mut self, other: &AABB) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Per-axis size, clamped at zero for empty or inverted boxes
    #[inline]
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    /// Center point of this box
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the box surface area (`dx*dy + dx*dz + dy*dz`).
    ///
    /// Every SAH comparison in this crate is a ratio or a difference of
    /// areas, so the constant factor 2 is dropped.
    #[inline]
    pub fn surface_area(&self) -> f32 {
        let d = self.extent();
        d.x * d.y + d.x * d.z + d.y * d.z
    }

    /// Surface area of `self ∪ other` without materializing the union
    #[inline]
    pub fn union_area(&self, other: &AABB) -> f32 {
        self.union(other).surface_area()
    }

    /// Index (0, 1, 2) of the axis with the largest extent
    pub fn longest_axis(&self) -> usize {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Test if this AABB fully contains another AABB (inclusive).
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Copy of this box with every inverted axis collapsed to its midpoint.
    pub fn sanitized(&self) -> AABB {
        let mid = self.center();
        let inverted = self.min.cmpgt(self.max);
        AABB {
            min: Vec3::select(inverted, mid, self.min),
            max: Vec3::select(inverted, mid, self.max),
        }
    }

    /// Expand outward by `fraction` of the box's own extent on each axis.
    ///
    /// This is the leaf "fat box": an object can move by up to
    /// `fraction * extent` on every side before it leaves its leaf.
    pub fn expanded_by_fraction(&self, fraction: f32) -> AABB {
        let margin = self.extent() * fraction;
        AABB {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Transform this local-space AABB by a matrix, returning a new AABB.
    ///
    /// Arvo method: projects each matrix axis onto the box extents for an
    /// exact result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
