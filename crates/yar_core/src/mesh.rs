//! Triangle mesh geometry for the yar scene description.
//!
//! A mesh is an indexed triangle list with optional per-vertex normals and a
//! per-triangle smooth/flat shading flag. Meshes never own their material;
//! they name it by id and the scene resolves the id during validation.

use serde::{Deserialize, Serialize};
use yar_math::{Aabb, Vec3};

/// An indexed triangle mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions (one Vec3 per vertex)
    pub vertices: Vec<Vec3>,

    /// Vertex normals, parallel to `vertices` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<Vec3>>,

    /// Vertex index triples, counter-clockwise front faces
    pub triangles: Vec<[u32; 3]>,

    /// Per-triangle shading flag: true interpolates vertex normals
    pub smooth: Vec<bool>,

    /// Material id, resolved against the scene's material table
    pub material: String,
}

impl TriangleMesh {
    /// Create a new mesh.
    ///
    /// No checks happen here; `Scene::new` validates indices, flag counts
    /// and the material reference.
    pub fn new(
        vertices: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        triangles: Vec<[u32; 3]>,
        smooth: Vec<bool>,
        material: impl Into<String>,
    ) -> Self {
        Self {
            vertices,
            normals,
            triangles,
            smooth,
            material: material.into(),
        }
    }

    /// Create a flat-shaded mesh without normals.
    pub fn flat(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>, material: impl Into<String>) -> Self {
        let smooth = vec![false; triangles.len()];
        Self::new(vertices, None, triangles, smooth, material)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// True if any triangle asks for interpolated normals.
    pub fn wants_smooth_shading(&self) -> bool {
        self.smooth.iter().any(|&s| s)
    }

    /// Positions of triangle `index`.
    ///
    /// Panics if the triangle or its vertex indices are out of range; a
    /// validated scene guarantees they are not.
    pub fn triangle_vertices(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit face normal of triangle `index`, or `None` for a zero-area triangle.
    pub fn face_normal(&self, index: usize) -> Option<Vec3> {
        let [v0, v1, v2] = self.triangle_vertices(index);
        (v1 - v0).cross(v2 - v0).try_normalize()
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud(&self.vertices)
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Face normals are accumulated unnormalized, so larger triangles weigh
    /// more. Vertices touched only by degenerate triangles fall back to +Y.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertices.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for &[i0, i1, i2] in &self.triangles {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.vertices[i0];
            let face_normal = (self.vertices[i1] - p0).cross(self.vertices[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }
}
