//! Surface-area-heuristic primitive splitter.
//!
//! Shared by the scene BVH build (one object per leaf) and the mesh BVH build
//! (several triangles per leaf). Inputs up to `BINNING_THRESHOLD` primitives
//! are swept exactly on every axis; larger inputs are binned by centroid.

use glam::Vec3;
use crate::scene::AABB;
use super::bvh_config::SplitSettings;

/// Above this many primitives the splitter switches to binning
pub const BINNING_THRESHOLD: usize = 1024;
/// Number of centroid bins per axis in binned mode
pub const BINS_COUNT: usize = 256;

/// Boxes whose surface area is below this are treated as degenerate
const DEGENERATE_AREA: f32 = 1.0e-12;

/// A bounding box plus an opaque id, alive only during a build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub aabb: AABB,
    pub id: u32,
}

impl Primitive {
    pub fn new(aabb: AABB, id: u32) -> Self {
        Self { aabb, id }
    }

    /// Primitive enclosing a triangle
    pub fn from_triangle(p0: Vec3, p1: Vec3, p2: Vec3, id: u32) -> Self {
        Self {
            aabb: AABB::new(p0.min(p1).min(p2), p0.max(p1).max(p2)),
            id,
        }
    }

    #[inline]
    fn centroid(&self) -> Vec3 {
        self.aabb.center()
    }
}

/// Outcome of one split step.
///
/// An empty `right_indices` means "make a leaf of `left_indices`".
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub left_indices: Vec<u32>,
    pub right_indices: Vec<u32>,
    pub left_bounds: AABB,
    pub right_bounds: AABB,
}

impl SplitResult {
    fn leaf(indices: &[u32], bounds: AABB) -> Self {
        Self {
            left_indices: indices.to_vec(),
            right_indices: Vec::new(),
            left_bounds: bounds,
            right_bounds: AABB::EMPTY,
        }
    }

    /// Whether the splitter decided not to divide the input
    pub fn is_leaf(&self) -> bool {
        self.right_indices.is_empty()
    }
}

/// Best candidate found so far
struct Candidate {
    cost: f32,
    axis: usize,
    /// Sweep: first position on the right side. Binned: last bin on the left.
    position: usize,
    left_bounds: AABB,
    right_bounds: AABB,
}

/// Partition `indices` (into `prims`) in two using the SAH cost
/// `traversal + SA(L)/SA(T)*|L| + SA(R)/SA(T)*|R|`.
///
/// `bounds` must be the union of the referenced primitives' boxes.
pub fn split_primitives_sah(
    prims: &[Primitive],
    indices: &[u32],
    bounds: &AABB,
    settings: &SplitSettings,
) -> SplitResult {
    let count = indices.len();
    if count <= settings.min_primitives_in_leaf.max(1) {
        return SplitResult::leaf(indices, *bounds);
    }

    let total_area = bounds.surface_area();
    if total_area < DEGENERATE_AREA {
        return median_split(prims, indices);
    }

    // Flat leaf cost scaled by the threshold; `None` accepts any finite cost.
    let max_cost = settings
        .oversplit_threshold
        .map_or(f32::INFINITY, |threshold| threshold * count as f32);

    let best = if count > BINNING_THRESHOLD {
        find_binned_split(prims, indices, total_area, max_cost, settings)
            .map(|candidate| partition_binned(prims, indices, &candidate))
    } else {
        find_sweep_split(prims, indices, total_area, max_cost, settings)
    };

    match best {
        Some(result) => result,
        None if settings.oversplit_threshold.is_none() => median_split(prims, indices),
        None => SplitResult::leaf(indices, *bounds),
    }
}

/// Exact sweep: sort by box maximum on each axis and evaluate every cut.
fn find_sweep_split(
    prims: &[Primitive],
    indices: &[u32],
    total_area: f32,
    max_cost: f32,
    settings: &SplitSettings,
) -> Option<SplitResult> {
    let count = indices.len();
    let inv_area = 1.0 / total_area;
    let mut best: Option<Candidate> = None;
    let mut best_order: Vec<u32> = Vec::new();

    let mut order: Vec<u32> = indices.to_vec();
    let mut suffix_bounds = vec![AABB::EMPTY; count];

    for axis in 0..3 {
        order.sort_by(|&a, &b| {
            prims[a as usize].aabb.max[axis].total_cmp(&prims[b as usize].aabb.max[axis])
        });

        // suffix_bounds[i] = union of order[i..]
        let mut acc = AABB::EMPTY;
        for i in (0..count).rev() {
            acc.grow(&prims[order[i] as usize].aabb);
            suffix_bounds[i] = acc;
        }

        let mut left = AABB::EMPTY;
        let mut improved = false;
        for i in 1..count {
            left.grow(&prims[order[i - 1] as usize].aabb);
            let right = &suffix_bounds[i];
            let cost = settings.node_traversal_cost
                + (left.surface_area() * i as f32 + right.surface_area() * (count - i) as f32)
                    * inv_area;

            let threshold = best.as_ref().map_or(max_cost, |b| b.cost);
            if cost < threshold {
                best = Some(Candidate {
                    cost,
                    axis,
                    position: i,
                    left_bounds: left,
                    right_bounds: *right,
                });
                improved = true;
            }
        }

        if improved {
            best_order.clone_from(&order);
        }
    }

    let best = best?;
    let (left, right) = best_order.split_at(best.position);
    Some(SplitResult {
        left_indices: left.to_vec(),
        right_indices: right.to_vec(),
        left_bounds: best.left_bounds,
        right_bounds: best.right_bounds,
    })
}

#[derive(Clone, Copy)]
struct Bin {
    bounds: AABB,
    count: usize,
}

/// Bin of a centroid coordinate on one axis
fn bin_index(centroid: f32, min: f32, scale: f32) -> usize {
    (((centroid - min) * scale) as usize).min(BINS_COUNT - 1)
}

/// Binned SAH over centroid bins on every non-flat axis.
fn find_binned_split(
    prims: &[Primitive],
    indices: &[u32],
    total_area: f32,
    max_cost: f32,
    settings: &SplitSettings,
) -> Option<Candidate> {
    let inv_area = 1.0 / total_area;
    let centroid_bounds = centroid_bounds(prims, indices);
    let mut best: Option<Candidate> = None;

    for axis in 0..3 {
        let min = centroid_bounds.min[axis];
        let extent = centroid_bounds.max[axis] - min;
        if extent < f32::EPSILON {
            continue;
        }
        let scale = BINS_COUNT as f32 / extent;

        let mut bins = [Bin { bounds: AABB::EMPTY, count: 0 }; BINS_COUNT];
        for &index in indices {
            let prim = &prims[index as usize];
            let bin = &mut bins[bin_index(prim.centroid()[axis], min, scale)];
            bin.count += 1;
            bin.bounds.grow(&prim.aabb);
        }

        // right_*[i] describes bins (i + 1)..BINS_COUNT
        let mut right_area = [0.0f32; BINS_COUNT - 1];
        let mut right_count = [0usize; BINS_COUNT - 1];
        let mut right_bounds = [AABB::EMPTY; BINS_COUNT - 1];
        let mut acc = AABB::EMPTY;
        let mut acc_count = 0;
        for i in (0..BINS_COUNT - 1).rev() {
            acc.grow(&bins[i + 1].bounds);
            acc_count += bins[i + 1].count;
            right_area[i] = acc.surface_area();
            right_count[i] = acc_count;
            right_bounds[i] = acc;
        }

        let mut left = AABB::EMPTY;
        let mut left_count = 0;
        for i in 0..BINS_COUNT - 1 {
            left.grow(&bins[i].bounds);
            left_count += bins[i].count;
            if left_count == 0 || right_count[i] == 0 {
                continue;
            }

            let cost = settings.node_traversal_cost
                + (left.surface_area() * left_count as f32
                    + right_area[i] * right_count[i] as f32)
                    * inv_area;

            let threshold = best.as_ref().map_or(max_cost, |b| b.cost);
            if cost < threshold {
                best = Some(Candidate {
                    cost,
                    axis,
                    position: i,
                    left_bounds: left,
                    right_bounds: right_bounds[i],
                });
            }
        }
    }

    best
}

fn partition_binned(prims: &[Primitive], indices: &[u32], candidate: &Candidate) -> SplitResult {
    let centroid_bounds = centroid_bounds(prims, indices);
    let axis = candidate.axis;
    let min = centroid_bounds.min[axis];
    let scale = BINS_COUNT as f32 / (centroid_bounds.max[axis] - min);

    let (left, right): (Vec<u32>, Vec<u32>) = indices.iter().partition(|&&index| {
        bin_index(prims[index as usize].centroid()[axis], min, scale) <= candidate.position
    });

    SplitResult {
        left_indices: left,
        right_indices: right,
        left_bounds: candidate.left_bounds,
        right_bounds: candidate.right_bounds,
    }
}

fn centroid_bounds(prims: &[Primitive], indices: &[u32]) -> AABB {
    let mut bounds = AABB::EMPTY;
    for &index in indices {
        let c = prims[index as usize].centroid();
        bounds.grow(&AABB::new(c, c));
    }
    bounds
}

/// Halve the input by centroid order along the longest centroid axis.
///
/// Used for degenerate (zero-area) bounds and when SAH finds no split but a
/// split is mandatory. Coincident centroids keep their input order, so the
/// split is then by index.
fn median_split(prims: &[Primitive], indices: &[u32]) -> SplitResult {
    let axis = centroid_bounds(prims, indices).longest_axis();

    let mut order = indices.to_vec();
    order.sort_by(|&a, &b| {
        prims[a as usize].centroid()[axis].total_cmp(&prims[b as usize].centroid()[axis])
    });

    let right = order.split_off(order.len() / 2);
    let bounds_of = |list: &[u32]| {
        list.iter()
            .fold(AABB::EMPTY, |acc, &index| acc.union(&prims[index as usize].aabb))
    };

    SplitResult {
        left_bounds: bounds_of(&order),
        right_bounds: bounds_of(&right),
        left_indices: order,
        right_indices: right,
    }
}

#[cfg(test)]
#[path = "bvh_split_tests.rs"]
mod tests;
