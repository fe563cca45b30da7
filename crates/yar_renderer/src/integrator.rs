//! Whitted-style recursive shading.
//!
//! Each hit is shaded with Blinn-Phong: the material's ambient term plus a
//! Lambertian and a half-vector specular lobe per visible point light.
//! Materials with a non-zero reflectivity also trace a mirror ray, one level
//! deeper, until the configured maximum depth.

use crate::Hittable;
use yar_core::{BlinnPhong, Integrator, Light, Material, PointLight, Scene, MAX_TRACE_DEPTH};
use yar_math::{Color, Interval, Ray, Vec3};

/// Smallest ray parameter accepted as a hit.
pub const HIT_EPSILON: f32 = 1e-4;

/// Offset of secondary ray origins along the shading normal.
pub const SHADOW_BIAS: f32 = 1e-3;

/// Whitted integrator over a scene and the structure used to trace it.
pub struct Whitted<'a> {
    scene: &'a Scene,
    world: &'a dyn Hittable,
    max_depth: u32,
}

impl<'a> Whitted<'a> {
    /// Integrator with the scene's configured maximum depth.
    pub fn new(scene: &'a Scene, world: &'a dyn Hittable) -> Self {
        let Integrator::Whitted { max_depth } = scene.integrator();
        Self {
            scene,
            world,
            max_depth,
        }
    }

    /// Override the maximum recursion depth, capped at [`MAX_TRACE_DEPTH`].
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.min(MAX_TRACE_DEPTH);
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Compute the color seen along `ray`.
    ///
    /// Primary rays start at depth 0. Past the maximum depth the result is
    /// black; a ray that leaves the scene returns the background colour.
    pub fn shade(&self, ray: &Ray, depth: u32) -> Color {
        if depth > self.max_depth {
            return Color::ZERO;
        }

        let Some(rec) = self
            .world
            .hit(ray, Interval::new(HIT_EPSILON, f32::INFINITY))
        else {
            return self.scene.background();
        };

        let Material::BlinnPhong(material) = &self.scene.materials()[rec.material];
        let normal = rec.normal;
        let view = -ray.direction;
        let origin = rec.p + normal * SHADOW_BIAS;

        let mut color = material.ambient;

        for light in self.scene.lights() {
            let Light::Point(point) = light;
            color += self.direct(material, point, origin, normal, view);
        }

        if material.reflectivity > 0.0 && depth < self.max_depth {
            if let Some(dir) = reflect(ray.direction, normal).try_normalize() {
                let reflected = Ray::new(origin, dir);
                color += material.reflectivity * self.shade(&reflected, depth + 1);
            }
        }

        color
    }

    /// Diffuse and specular contribution of one point light, zero if the
    /// light is behind the surface or something blocks it.
    fn direct(
        &self,
        material: &BlinnPhong,
        light: &PointLight,
        origin: Vec3,
        normal: Vec3,
        view: Vec3,
    ) -> Color {
        let to_light = light.position - origin;
        let distance = to_light.length();
        let Some(light_dir) = to_light.try_normalize() else {
            return Color::ZERO;
        };

        let n_dot_l = normal.dot(light_dir);
        if n_dot_l <= 0.0 {
            return Color::ZERO;
        }

        let shadow_ray = Ray::new(origin, light_dir);
        if self
            .world
            .occluded(&shadow_ray, Interval::new(HIT_EPSILON, distance))
        {
            return Color::ZERO;
        }

        let radiance = light.intensity * light.falloff.attenuation(distance);

        let diffuse = material.diffuse * n_dot_l;
        let specular = match (light_dir + view).try_normalize() {
            Some(half) => material.specular * normal.dot(half).max(0.0).powf(material.shininess),
            None => Color::ZERO,
        };

        (diffuse + specular) * radiance
    }
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
