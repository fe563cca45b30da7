//! Scene description types for yar.
//!
//! Two layers live here. [`SceneDesc`] is the plain, serializable form that
//! scene files map onto. [`Scene`] is the validated form the renderer
//! consumes: every material reference is resolved, every index is in range,
//! and nothing changes after construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use yar_math::{Aabb, Color, Vec3};

use crate::mesh::TriangleMesh;

/// Errors found while validating a scene description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("mesh {mesh} references unknown material '{material}'")]
    UnknownMaterial { mesh: usize, material: String },

    #[error("material id '{0}' is defined more than once")]
    DuplicateMaterial(String),

    #[error("mesh {mesh} has {flags} smooth flags for {triangles} triangles")]
    SmoothFlagMismatch {
        mesh: usize,
        flags: usize,
        triangles: usize,
    },

    #[error("mesh {mesh} triangle {triangle} uses vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        mesh: usize,
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh {mesh} has {normals} normals for {vertices} vertices")]
    NormalCountMismatch {
        mesh: usize,
        normals: usize,
        vertices: usize,
    },

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("invalid material '{id}': {reason}")]
    InvalidMaterial { id: String, reason: String },

    #[error("BVH max leaf size must be at least 1")]
    InvalidMaxLeafSize,

    #[error("max depth {max_depth} exceeds the limit of {limit}")]
    InvalidMaxDepth { max_depth: u32, limit: u32 },

    #[error("{what} has a negative colour component")]
    NegativeColor { what: String },

    #[error("non-finite value in {what}")]
    NonFinite { what: String },
}

/// Result type for scene validation.
pub type SceneResult<T> = Result<T, SceneError>;

/// Deepest recursion a Whitted integrator may be configured with.
pub const MAX_TRACE_DEPTH: u32 = 64;

/// Blinn-Phong surface parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlinnPhong {
    /// Unique material id within the scene
    pub id: String,

    /// Constant term, added regardless of lighting
    pub ambient: Color,

    /// Lambertian reflectance
    pub diffuse: Color,

    /// Specular reflectance for the half-vector lobe
    pub specular: Color,

    /// Specular exponent (> 0)
    pub shininess: f32,

    /// Mirror reflection weight in [0, 1]. Zero disables reflection rays.
    #[serde(default)]
    pub reflectivity: f32,
}

impl BlinnPhong {
    /// Create a non-reflective Blinn-Phong material.
    pub fn new(
        id: impl Into<String>,
        ambient: Color,
        diffuse: Color,
        specular: Color,
        shininess: f32,
    ) -> Self {
        Self {
            id: id.into(),
            ambient,
            diffuse,
            specular,
            shininess,
            reflectivity: 0.0,
        }
    }

    /// Set the mirror reflection weight.
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    /// Largest colour any single light can produce on this surface,
    /// per unit of light intensity.
    pub fn max_response(&self) -> Color {
        self.diffuse + self.specular
    }
}

/// A surface material. Only Blinn-Phong exists today.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    BlinnPhong(BlinnPhong),
}

impl Material {
    /// The material's id.
    pub fn id(&self) -> &str {
        match self {
            Material::BlinnPhong(m) => &m.id,
        }
    }

    fn validate(&self) -> SceneResult<()> {
        match self {
            Material::BlinnPhong(m) => {
                let invalid = |reason: &str| SceneError::InvalidMaterial {
                    id: m.id.clone(),
                    reason: reason.to_string(),
                };

                for (name, c) in [
                    ("ambient", m.ambient),
                    ("diffuse", m.diffuse),
                    ("specular", m.specular),
                ] {
                    if !c.is_finite() {
                        return Err(SceneError::NonFinite {
                            what: format!("material '{}' {}", m.id, name),
                        });
                    }
                    if c.min_element() < 0.0 {
                        return Err(invalid(&format!("{} colour is negative", name)));
                    }
                }
                if !(m.shininess.is_finite() && m.shininess > 0.0) {
                    return Err(invalid("shininess must be a positive number"));
                }
                if !(0.0..=1.0).contains(&m.reflectivity) {
                    return Err(invalid("reflectivity must be within [0, 1]"));
                }
                Ok(())
            }
        }
    }
}

/// How a point light's intensity drops with distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Falloff {
    /// Intensity is the same at every distance
    #[default]
    Constant,
    /// Intensity divided by squared distance
    InverseSquare,
}

impl Falloff {
    /// Attenuation factor at `distance` from the light.
    pub fn attenuation(self, distance: f32) -> f32 {
        match self {
            Falloff::Constant => 1.0,
            Falloff::InverseSquare => 1.0 / (distance * distance).max(f32::EPSILON),
        }
    }
}

/// An omni-directional point light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
    #[serde(default)]
    pub falloff: Falloff,
}

impl PointLight {
    /// Point light with constant falloff.
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
            falloff: Falloff::Constant,
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }
}

/// A light source. Only point lights exist today.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Light {
    Point(PointLight),
}

/// Shading algorithm selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Integrator {
    /// Recursive Whitted-style ray tracing.
    Whitted { max_depth: u32 },
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator::Whitted { max_depth: 3 }
    }
}

/// Acceleration structure selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Accelerator {
    /// Bounding volume hierarchy with at most `max_leaf_size` triangles per leaf.
    Bvh { max_leaf_size: usize },
}

impl Default for Accelerator {
    fn default() -> Self {
        Accelerator::Bvh { max_leaf_size: 4 }
    }
}

/// Pinhole camera parameters as written in a scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Distance from the eye to the image plane, which spans [-1, 1] vertically
    pub focal_length: f32,
    /// Viewing direction, need not be normalized
    pub look_dir: Vec3,
    /// Approximate up direction, must not be parallel to `look_dir`
    pub up_dir: Vec3,
    /// Eye position
    pub position: Vec3,
}

impl CameraDesc {
    fn validate(&self) -> SceneResult<()> {
        let invalid = |reason: &str| Err(SceneError::InvalidCamera(reason.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("image width and height must be positive");
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return invalid("focal length must be a positive number");
        }
        for (name, v) in [
            ("look direction", self.look_dir),
            ("up direction", self.up_dir),
            ("position", self.position),
        ] {
            if !v.is_finite() {
                return Err(SceneError::NonFinite {
                    what: format!("camera {}", name),
                });
            }
        }

        let Some(forward) = self.look_dir.try_normalize() else {
            return invalid("look direction has zero length");
        };
        let Some(up) = self.up_dir.try_normalize() else {
            return invalid("up direction has zero length");
        };
        if forward.cross(up).length_squared() < 1e-12 {
            return invalid("up direction is parallel to the look direction");
        }
        Ok(())
    }
}

/// Unvalidated scene, the shape of a scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub integrator: Integrator,
    #[serde(default)]
    pub accelerator: Accelerator,
    pub camera: CameraDesc,
    /// Colour returned for rays that leave the scene
    #[serde(default)]
    pub background: Color,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub meshes: Vec<TriangleMesh>,
}

impl SceneDesc {
    /// Empty scene with the given camera and default settings.
    pub fn new(camera: CameraDesc) -> Self {
        Self {
            integrator: Integrator::default(),
            accelerator: Accelerator::default(),
            camera,
            background: Color::ZERO,
            materials: Vec::new(),
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }
}

/// A validated, read-only scene.
#[derive(Clone, Debug)]
pub struct Scene {
    integrator: Integrator,
    accelerator: Accelerator,
    camera: CameraDesc,
    background: Color,
    materials: Vec<Material>,
    lights: Vec<Light>,
    meshes: Vec<TriangleMesh>,
    /// Index into `materials` for each mesh
    mesh_materials: Vec<usize>,
}

impl Scene {
    /// Validate a scene description.
    ///
    /// Fails on the first configuration problem. Meshes that flag smooth
    /// triangles but carry no normals get computed vertex normals.
    pub fn new(desc: SceneDesc) -> SceneResult<Self> {
        let SceneDesc {
            integrator,
            accelerator,
            camera,
            background,
            materials,
            lights,
            mut meshes,
        } = desc;

        camera.validate()?;

        let Accelerator::Bvh { max_leaf_size } = accelerator;
        if max_leaf_size == 0 {
            return Err(SceneError::InvalidMaxLeafSize);
        }

        let Integrator::Whitted { max_depth } = integrator;
        if max_depth > MAX_TRACE_DEPTH {
            return Err(SceneError::InvalidMaxDepth {
                max_depth,
                limit: MAX_TRACE_DEPTH,
            });
        }

        if !background.is_finite() {
            return Err(SceneError::NonFinite {
                what: "background".to_string(),
            });
        }
        if background.min_element() < 0.0 {
            return Err(SceneError::NegativeColor {
                what: "background".to_string(),
            });
        }

        let mut material_ids: HashMap<&str, usize> = HashMap::with_capacity(materials.len());
        for (index, material) in materials.iter().enumerate() {
            material.validate()?;
            if material_ids.insert(material.id(), index).is_some() {
                return Err(SceneError::DuplicateMaterial(material.id().to_string()));
            }
        }

        for (index, light) in lights.iter().enumerate() {
            let Light::Point(point) = light;
            if !(point.position.is_finite() && point.intensity.is_finite()) {
                return Err(SceneError::NonFinite {
                    what: format!("light {}", index),
                });
            }
            if point.intensity.min_element() < 0.0 {
                return Err(SceneError::NegativeColor {
                    what: format!("light {} intensity", index),
                });
            }
        }

        let mut mesh_materials = Vec::with_capacity(meshes.len());
        for (index, mesh) in meshes.iter_mut().enumerate() {
            validate_mesh(index, mesh)?;

            let material = material_ids.get(mesh.material.as_str()).copied().ok_or_else(|| {
                SceneError::UnknownMaterial {
                    mesh: index,
                    material: mesh.material.clone(),
                }
            })?;
            mesh_materials.push(material);

            log::debug!(
                "Mesh {}: {} vertices, {} triangles, material '{}'",
                index,
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.material
            );
        }

        let scene = Self {
            integrator,
            accelerator,
            camera,
            background,
            materials,
            lights,
            meshes,
            mesh_materials,
        };

        log::info!(
            "Scene validated: {} meshes, {} triangles, {} materials, {} lights",
            scene.meshes.len(),
            scene.total_triangle_count(),
            scene.materials.len(),
            scene.lights.len()
        );
        if scene.total_triangle_count() == 0 {
            log::warn!("Scene has no triangles; every pixel will be background");
        }

        Ok(scene)
    }

    pub fn integrator(&self) -> Integrator {
        self.integrator
    }

    pub fn accelerator(&self) -> Accelerator {
        self.accelerator
    }

    pub fn camera(&self) -> &CameraDesc {
        &self.camera
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn meshes(&self) -> &[TriangleMesh] {
        &self.meshes
    }

    /// Index into `materials()` used by mesh `mesh_index`.
    pub fn material_index(&self, mesh_index: usize) -> usize {
        self.mesh_materials[mesh_index]
    }

    /// Material used by mesh `mesh_index`.
    pub fn material_for_mesh(&self, mesh_index: usize) -> &Material {
        &self.materials[self.mesh_materials[mesh_index]]
    }

    /// Sum of triangle counts over all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(TriangleMesh::triangle_count).sum()
    }

    /// Bounds of all mesh vertices.
    pub fn bounds(&self) -> Aabb {
        self.meshes.iter().fold(Aabb::EMPTY, |acc, mesh| {
            Aabb::surrounding(&acc, &mesh.bounds())
        })
    }

    /// Convert back into the serializable form.
    pub fn to_desc(&self) -> SceneDesc {
        SceneDesc {
            integrator: self.integrator,
            accelerator: self.accelerator,
            camera: self.camera.clone(),
            background: self.background,
            materials: self.materials.clone(),
            lights: self.lights.clone(),
            meshes: self.meshes.clone(),
        }
    }
}

impl TryFrom<SceneDesc> for Scene {
    type Error = SceneError;

    fn try_from(desc: SceneDesc) -> SceneResult<Self> {
        Scene::new(desc)
    }
}

/// Structural checks for one mesh. Fills in normals where smooth shading needs them.
fn validate_mesh(index: usize, mesh: &mut TriangleMesh) -> SceneResult<()> {
    let vertex_count = mesh.vertex_count();

    if mesh.smooth.len() != mesh.triangle_count() {
        return Err(SceneError::SmoothFlagMismatch {
            mesh: index,
            flags: mesh.smooth.len(),
            triangles: mesh.triangle_count(),
        });
    }

    if mesh.vertices.iter().any(|v| !v.is_finite()) {
        return Err(SceneError::NonFinite {
            what: format!("mesh {} vertices", index),
        });
    }

    for (triangle, indices) in mesh.triangles.iter().enumerate() {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SceneError::IndexOutOfBounds {
                mesh: index,
                triangle,
                index: bad,
                vertex_count,
            });
        }
    }

    match &mesh.normals {
        Some(normals) if normals.len() != vertex_count => {
            return Err(SceneError::NormalCountMismatch {
                mesh: index,
                normals: normals.len(),
                vertices: vertex_count,
            });
        }
        Some(normals) if normals.iter().any(|n| !n.is_finite()) => {
            return Err(SceneError::NonFinite {
                what: format!("mesh {} normals", index),
            });
        }
        Some(_) => {}
        None if mesh.wants_smooth_shading() => {
            log::debug!("Mesh {} has smooth triangles but no normals, computing them", index);
            mesh.compute_normals();
        }
        None => {}
    }

    Ok(())
}
