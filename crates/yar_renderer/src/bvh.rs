//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to each other by index. Leaves own a
//! contiguous range of the BVH's reordered triangle list, so the structure
//! holds only indices back into the scene's meshes, never vertex data.

use crate::triangle::{Triangle, TriangleRef};
use crate::{HitRecord, Hittable};
use yar_core::{Accelerator, Scene};
use yar_math::{Aabb, Interval, Ray, Vec3};

/// Traversal stack size. Median splits keep the depth at ceil(log2(n)),
/// far below this for any triangle count that fits in memory.
const STACK_SIZE: usize = 64;

/// BVH node - either a branch with two children or a leaf with triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// Internal node. `left` holds the triangles with smaller centroids along `axis`.
    Branch {
        bbox: Aabb,
        left: u32,
        right: u32,
        axis: u8,
    },
    /// Leaf covering `triangles[first..first + count]`.
    Leaf { bbox: Aabb, first: u32, count: u32 },
}

impl BvhNode {
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Shape of a built tree, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    pub largest_leaf: usize,
    pub triangles: usize,
}

/// Per-triangle data needed only while building.
struct BuildPrim {
    reference: TriangleRef,
    bbox: Aabb,
    centroid: Vec3,
}

/// BVH over every triangle of a scene.
pub struct Bvh<'s> {
    scene: &'s Scene,
    nodes: Vec<BvhNode>,
    triangles: Vec<TriangleRef>,
    max_leaf_size: usize,
}

impl<'s> Bvh<'s> {
    /// Build with the leaf size configured in the scene.
    pub fn new(scene: &'s Scene) -> Self {
        let Accelerator::Bvh { max_leaf_size } = scene.accelerator();
        Self::with_max_leaf_size(scene, max_leaf_size)
    }

    /// Build with an explicit leaf size (clamped to at least 1).
    pub fn with_max_leaf_size(scene: &'s Scene, max_leaf_size: usize) -> Self {
        let max_leaf_size = max_leaf_size.max(1);

        let mut prims: Vec<BuildPrim> = TriangleRef::all(scene)
            .map(|reference| {
                let tri = Triangle::resolve(scene, reference);
                BuildPrim {
                    reference,
                    bbox: tri.bounding_box(),
                    centroid: tri.centroid(),
                }
            })
            .collect();

        let mut bvh = Self {
            scene,
            nodes: Vec::with_capacity(2 * prims.len() / max_leaf_size + 1),
            triangles: Vec::new(),
            max_leaf_size,
        };

        if prims.is_empty() {
            bvh.nodes.push(BvhNode::Leaf {
                bbox: Aabb::EMPTY,
                first: 0,
                count: 0,
            });
        } else {
            bvh.build(&mut prims, 0);
        }

        bvh.triangles = prims.into_iter().map(|p| p.reference).collect();
        bvh
    }

    /// Recursive BVH construction over `prims`, which sit at `offset` in the
    /// final triangle order. Returns the index of the created node.
    ///
    /// Simple median-split approach: partition triangles around the median
    /// centroid on the longest axis of the centroid bounds, recurse. Splitting
    /// by count always shrinks both halves, so leaves never exceed the
    /// configured size even when many centroids coincide.
    fn build(&mut self, prims: &mut [BuildPrim], offset: usize) -> u32 {
        let n = prims.len();
        let bbox = prims
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bbox));
        let index = self.nodes.len() as u32;

        if n <= self.max_leaf_size {
            self.nodes.push(BvhNode::Leaf {
                bbox,
                first: offset as u32,
                count: n as u32,
            });
            return index;
        }

        let axis = centroid_split_axis(prims);
        let mid = n / 2;
        prims.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        // Reserve the slot, children are appended after it
        self.nodes.push(BvhNode::Leaf {
            bbox,
            first: 0,
            count: 0,
        });

        let (left_prims, right_prims) = prims.split_at_mut(mid);
        let left = self.build(left_prims, offset);
        let right = self.build(right_prims, offset + mid);

        self.nodes[index as usize] = BvhNode::Branch {
            bbox,
            left,
            right,
            axis: axis as u8,
        };
        index
    }

    /// The node arena, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Triangles in leaf order.
    pub fn triangles(&self) -> &[TriangleRef] {
        &self.triangles
    }

    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// Count nodes, leaves and depth.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            nodes: self.nodes.len(),
            triangles: self.triangles.len(),
            ..Default::default()
        };

        let mut stack = vec![(0u32, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            stats.depth = stats.depth.max(depth);
            match self.nodes[index as usize] {
                BvhNode::Leaf { count, .. } => {
                    stats.leaves += 1;
                    stats.largest_leaf = stats.largest_leaf.max(count as usize);
                }
                BvhNode::Branch { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }

        stats
    }

    fn leaf_triangles(&self, first: u32, count: u32) -> impl Iterator<Item = Triangle> + '_ {
        let range = first as usize..(first + count) as usize;
        self.triangles[range]
            .iter()
            .map(move |&reference| Triangle::resolve(self.scene, reference))
    }

    /// Walk every node whose box the ray enters within the current interval.
    ///
    /// `visit` gets each leaf triangle together with the live interval and
    /// returns the new upper bound (to shrink the search) or `None` to stop.
    fn traverse<F>(&self, ray: &Ray, ray_t: Interval, mut visit: F)
    where
        F: FnMut(&Triangle, Interval) -> Option<f32>,
    {
        let mut interval = ray_t;
        let mut stack = [0u32; STACK_SIZE];
        let mut sp = 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.nodes[stack[sp] as usize];
            if !node.bbox().hit(ray, interval) {
                continue;
            }

            match *node {
                BvhNode::Leaf { first, count, .. } => {
                    for tri in self.leaf_triangles(first, count) {
                        match visit(&tri, interval) {
                            Some(max) => interval = interval.with_max(max),
                            None => return,
                        }
                    }
                }
                BvhNode::Branch {
                    left, right, axis, ..
                } => {
                    // Push the far child first so the near one is popped next
                    let (near, far) = if ray.direction[axis as usize] < 0.0 {
                        (right, left)
                    } else {
                        (left, right)
                    };
                    stack[sp] = far;
                    stack[sp + 1] = near;
                    sp += 2;
                }
            }
        }
    }
}

impl Hittable for Bvh<'_> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;

        self.traverse(ray, ray_t, |tri, interval| match tri.hit(ray, interval) {
            Some(rec) => {
                closest = Some(rec);
                Some(rec.t)
            }
            None => Some(interval.max),
        });

        closest
    }

    fn occluded(&self, ray: &Ray, ray_t: Interval) -> bool {
        let mut blocked = false;

        self.traverse(ray, ray_t, |tri, interval| {
            if tri.hit(ray, interval).is_some() {
                blocked = true;
                None
            } else {
                Some(interval.max)
            }
        });

        blocked
    }

    fn bounding_box(&self) -> Aabb {
        *self.nodes[0].bbox()
    }
}

/// Longest axis of the bounds of the triangle centroids.
fn centroid_split_axis(prims: &[BuildPrim]) -> usize {
    let (lo, hi) = prims.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(p.centroid), hi.max(p.centroid)),
    );
    let extent = hi - lo;

    if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    }
}
