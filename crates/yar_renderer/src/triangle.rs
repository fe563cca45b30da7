//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Triangles are not stored on their own: a [`TriangleRef`] names a triangle
//! inside one of the scene's meshes, and [`Triangle::resolve`] gathers the
//! vertex data needed to intersect it.

use crate::hittable::HitRecord;
use yar_core::Scene;
use yar_math::{Aabb, Interval, Ray, Vec3};

/// Relative threshold below which a ray counts as parallel to the triangle
/// plane. Scaled by the edge lengths so it works at any scene scale.
const PARALLEL_EPSILON: f32 = 1e-7;

/// Index of a triangle within a scene: mesh number plus triangle number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleRef {
    pub mesh: u32,
    pub index: u32,
}

impl TriangleRef {
    pub fn new(mesh: u32, index: u32) -> Self {
        Self { mesh, index }
    }

    /// Every triangle of every mesh, in mesh order.
    pub fn all(scene: &Scene) -> impl Iterator<Item = TriangleRef> + '_ {
        scene
            .meshes()
            .iter()
            .enumerate()
            .flat_map(|(mesh, m)| {
                (0..m.triangle_count()).map(move |index| TriangleRef::new(mesh as u32, index as u32))
            })
    }
}

/// A triangle with its vertex data copied out of the mesh.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Vertex normals, present only when this triangle is smooth shaded
    vertex_normals: Option<[Vec3; 3]>,
    /// Index into the scene's material table
    material: usize,
    reference: TriangleRef,
}

impl Triangle {
    /// Create a flat-shaded triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: usize, reference: TriangleRef) -> Self {
        Self {
            v0,
            v1,
            v2,
            vertex_normals: None,
            material,
            reference,
        }
    }

    /// Attach vertex normals, making the triangle smooth shaded.
    pub fn with_vertex_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.vertex_normals = Some(normals);
        self
    }

    /// Look up a triangle in a validated scene.
    pub fn resolve(scene: &Scene, reference: TriangleRef) -> Self {
        let mesh_index = reference.mesh as usize;
        let index = reference.index as usize;
        let mesh = &scene.meshes()[mesh_index];
        let [v0, v1, v2] = mesh.triangle_vertices(index);

        let triangle = Self::new(v0, v1, v2, scene.material_index(mesh_index), reference);

        match &mesh.normals {
            Some(normals) if mesh.smooth[index] => {
                let [a, b, c] = mesh.triangles[index];
                triangle.with_vertex_normals([
                    normals[a as usize],
                    normals[b as usize],
                    normals[c as usize],
                ])
            }
            _ => triangle,
        }
    }

    pub fn is_smooth(&self) -> bool {
        self.vertex_normals.is_some()
    }

    /// Bounding box of the three vertices.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_point_cloud(&[self.v0, self.v1, self.v2])
    }

    /// Average of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Reports a hit only for `ray_t.min < t < ray_t.max`. Points on an edge
    /// or vertex count as inside, so two triangles sharing an edge leave no
    /// gap. Parallel rays and zero-area triangles never hit.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to the plane, or the triangle has no area
        if a.abs() <= PARALLEL_EPSILON * edge1.length() * edge2.length() {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        // Normals always point against the incoming ray. Vertex normals
        // carry their own orientation, so they are flipped independently of
        // the winding.
        let face_normal = edge1.cross(edge2).normalize();
        let front_face = ray.direction.dot(face_normal) < 0.0;
        let geometric_normal = if front_face { face_normal } else { -face_normal };

        let normal = match self.vertex_normals {
            Some([n0, n1, n2]) => match ((1.0 - u - v) * n0 + u * n1 + v * n2).try_normalize() {
                Some(n) if n.dot(ray.direction) > 0.0 => -n,
                Some(n) => n,
                None => geometric_normal,
            },
            None => geometric_normal,
        };

        Some(HitRecord {
            t,
            p: ray.at(t),
            normal,
            geometric_normal,
            material: self.material,
            triangle: self.reference,
            u,
            v,
            front_face,
        })
    }
}
