/// Static BVH over triangles (or any primitive boxes) with multi-primitive
/// leaves.
///
/// Uses the same SAH splitter and breadth-first work queue as the scene BVH
/// build, but stores leaves as ranges into a primitive index array. The node
/// array is never modified after the build.

use std::collections::VecDeque;
use glam::Vec3;
use crate::engine_warn;
use crate::scene::AABB;
use super::bvh_config::SplitSettings;
use super::bvh_node::{separation_axis, NodeIndex, INVALID_NODE};
use super::bvh_split::{split_primitives_sah, Primitive};

/// Payload of a mesh BVH node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshBvhNodeKind {
    /// `prim_count` entries of `MeshBvh::prim_indices` starting at `first_prim`
    Leaf { first_prim: u32, prim_count: u32 },
    /// Two children ordered along `space_axis`
    Internal { left_child: NodeIndex, right_child: NodeIndex, space_axis: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBvhNode {
    pub aabb: AABB,
    pub parent: NodeIndex,
    pub kind: MeshBvhNodeKind,
}

impl MeshBvhNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, MeshBvhNodeKind::Leaf { .. })
    }
}

/// Flat mesh BVH; the root is node 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBvh {
    nodes: Vec<MeshBvhNode>,
    prim_indices: Vec<u32>,
}

impl MeshBvh {
    /// Build over an indexed triangle list. Primitive ids are triangle numbers.
    ///
    /// Triangles with a vertex index outside `positions` are skipped.
    pub fn from_triangles(positions: &[Vec3], indices: &[u32], settings: &SplitSettings) -> Self {
        let vertex = |index: u32| positions.get(index as usize).copied();
        let prims: Vec<Primitive> = indices
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(triangle, tri)| {
                Some(Primitive::from_triangle(
                    vertex(tri[0])?,
                    vertex(tri[1])?,
                    vertex(tri[2])?,
                    triangle as u32,
                ))
            })
            .collect();
        let skipped = indices.len() / 3 - prims.len();
        if skipped > 0 {
            engine_warn!("galaxy3d::MeshBvh",
                "Skipped {} triangles with out of range vertex indices", skipped);
        }
        build_mesh_bvh(&prims, settings)
    }

    pub fn nodes(&self) -> &[MeshBvhNode] {
        &self.nodes
    }

    /// Primitive ids, grouped by leaf
    pub fn prim_indices(&self) -> &[u32] {
        &self.prim_indices
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root box, `None` for an empty BVH
    pub fn bounds(&self) -> Option<AABB> {
        self.nodes.first().map(|node| node.aabb)
    }

    /// Primitive ids held by `node`; empty for internal nodes
    pub fn leaf_prims(&self, node: NodeIndex) -> &[u32] {
        match self.nodes[node as usize].kind {
            MeshBvhNodeKind::Leaf { first_prim, prim_count } => {
                &self.prim_indices[first_prim as usize..(first_prim + prim_count) as usize]
            }
            MeshBvhNodeKind::Internal { .. } => &[],
        }
    }
}

struct WorkItem {
    indices: Vec<u32>,
    bounds: AABB,
    parent: NodeIndex,
    is_left: bool,
}

/// Build a mesh BVH over `prims`. An empty input gives an empty BVH.
pub fn build_mesh_bvh(prims: &[Primitive], settings: &SplitSettings) -> MeshBvh {
    let mut bvh = MeshBvh::default();
    if prims.is_empty() {
        return bvh;
    }

    bvh.prim_indices.reserve(prims.len());
    let bounds = prims.iter().fold(AABB::EMPTY, |acc, prim| acc.union(&prim.aabb));

    let mut queue = VecDeque::new();
    queue.push_back(WorkItem {
        indices: (0..prims.len() as u32).collect(),
        bounds,
        parent: INVALID_NODE,
        is_left: true,
    });

    while let Some(item) = queue.pop_back() {
        let split = split_primitives_sah(prims, &item.indices, &item.bounds, settings);
        let index = bvh.nodes.len() as NodeIndex;

        let kind = if split.is_leaf() {
            let first_prim = bvh.prim_indices.len() as u32;
            bvh.prim_indices
                .extend(split.left_indices.iter().map(|&i| prims[i as usize].id));
            MeshBvhNodeKind::Leaf { first_prim, prim_count: split.left_indices.len() as u32 }
        } else {
            let space_axis = separation_axis(&split.left_bounds, &split.right_bounds);
            let mut left = (split.left_indices, split.left_bounds);
            let mut right = (split.right_indices, split.right_bounds);
            if left.1.center()[space_axis as usize] > right.1.center()[space_axis as usize] {
                std::mem::swap(&mut left, &mut right);
            }
            queue.push_front(WorkItem { indices: left.0, bounds: left.1, parent: index, is_left: true });
            queue.push_front(WorkItem { indices: right.0, bounds: right.1, parent: index, is_left: false });

            // Children are linked when they are popped
            MeshBvhNodeKind::Internal { left_child: INVALID_NODE, right_child: INVALID_NODE, space_axis }
        };

        bvh.nodes.push(MeshBvhNode { aabb: item.bounds, parent: item.parent, kind });

        if item.parent != INVALID_NODE {
            if let MeshBvhNodeKind::Internal { left_child, right_child, .. } =
                &mut bvh.nodes[item.parent as usize].kind
            {
                if item.is_left {
                    *left_child = index;
                } else {
                    *right_child = index;
                }
            }
        }
    }

    bvh
}
