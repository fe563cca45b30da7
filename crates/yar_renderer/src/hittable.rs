//! Hittable trait and HitRecord for ray-scene intersection.

use crate::triangle::{Triangle, TriangleRef};
use yar_core::Scene;
use yar_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Shading normal (interpolated or flat), flipped to face the ray
    pub normal: Vec3,
    /// Face normal, flipped to face the ray
    pub geometric_normal: Vec3,
    /// Index into the scene's material table
    pub material: usize,
    /// Triangle that was hit
    pub triangle: TriangleRef,
    /// Barycentric coordinates of the hit (weights of vertex 1 and 2)
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the counter-clockwise side of the triangle
    pub front_face: bool,
}

/// Anything rays can be traced against.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray_t.min < t < ray_t.max`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// True if anything at all lies on the ray within `ray_t`.
    ///
    /// Implementations may stop at the first intersection they find.
    fn occluded(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.hit(ray, ray_t).is_some()
    }

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// Every triangle of a scene in a flat list, tested one by one.
///
/// Slow, but obviously correct. Used as the reference the BVH is checked
/// against and handy for tiny scenes.
pub struct LinearScan {
    triangles: Vec<Triangle>,
    bbox: Aabb,
}

impl LinearScan {
    /// Collect all triangles of a scene.
    pub fn new(scene: &Scene) -> Self {
        let triangles: Vec<Triangle> = TriangleRef::all(scene)
            .map(|r| Triangle::resolve(scene, r))
            .collect();
        let bbox = triangles.iter().fold(Aabb::EMPTY, |acc, tri| {
            Aabb::surrounding(&acc, &tri.bounding_box())
        });

        Self { triangles, bbox }
    }

    /// Get the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Hittable for LinearScan {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest = None;
        let mut interval = ray_t;

        for tri in &self.triangles {
            if let Some(rec) = tri.hit(ray, interval) {
                interval = interval.with_max(rec.t);
                closest = Some(rec);
            }
        }

        closest
    }

    fn occluded(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.triangles.iter().any(|tri| tri.hit(ray, ray_t).is_some())
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
