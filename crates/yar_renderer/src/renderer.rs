//! Render driver and framebuffer.
//!
//! Builds the BVH once, shades every pixel through the Whitted integrator
//! in parallel buckets and collects the result into a [`Framebuffer`].

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{Bvh, Camera, Whitted};
use image::{ImageFormat, Rgb, RgbImage};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use yar_core::Scene;
use yar_math::Color;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Render configuration that does not live in the scene file.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Edge length of a bucket in pixels
    pub bucket_size: u32,
    /// Worker threads, `None` for rayon's global pool
    pub threads: Option<usize>,
    /// Apply gamma 2.0 when converting to 8-bit
    pub gamma: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            threads: None,
            gamma: false,
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range. NaN maps to 0.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color, gamma: bool) -> [u8; 3] {
    let encode = |c: f32| {
        let c = clamp_01(c);
        let c = if gamma { linear_to_gamma(c) } else { c };
        (255.0 * c).round() as u8
    };
    [encode(color.x), encode(color.y), encode(color.z)]
}

/// Shade the centre of pixel (x, y).
#[inline]
pub fn render_pixel(camera: &Camera, integrator: &Whitted, x: u32, y: u32) -> Color {
    let ray = camera.ray_for_pixel(x, y);
    integrator.shade(&ray, 0)
}

/// Linear colour image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.pixels[i] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let b = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let x = b.x + i as u32 % b.width;
            let y = b.y + i as u32 / b.width;
            self.set(x, y, *color);
        }
    }

    /// Packed 8-bit RGB bytes.
    pub fn to_rgb8(&self, gamma: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color, gamma));
        }
        bytes
    }

    pub fn to_image(&self, gamma: bool) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb(color_to_rgb(self.get(x, y), gamma))
        })
    }

    /// Write the framebuffer as a PNG, whatever the path's extension.
    pub fn save_png(&self, path: impl AsRef<Path>, gamma: bool) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.to_image(gamma).save_with_format(path, ImageFormat::Png)?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the scene.
///
/// The acceleration structure lives only for the duration of the call.
pub fn render(scene: &Scene, config: &RenderConfig) -> Result<Framebuffer, RenderError> {
    let build_start = Instant::now();
    let bvh = Bvh::new(scene);
    let stats = bvh.stats();
    log::info!(
        "Built BVH over {} triangles in {:.2?}: {} nodes, {} leaves, depth {}, largest leaf {} (max {})",
        stats.triangles,
        build_start.elapsed(),
        stats.nodes,
        stats.leaves,
        stats.depth,
        stats.largest_leaf,
        bvh.max_leaf_size()
    );

    let camera = Camera::new(scene.camera());
    let integrator = Whitted::new(scene, &bvh);
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);

    log::info!(
        "Rendering {}x{} in {} buckets",
        camera.image_width,
        camera.image_height,
        buckets.len()
    );

    let render_start = Instant::now();
    let trace = || -> Vec<BucketResult> {
        buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, &camera, &integrator))
            .collect()
    };

    let results = match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            log::debug!("Using a dedicated pool of {} threads", pool.current_num_threads());
            pool.install(trace)
        }
        None => trace(),
    };

    let mut framebuffer = Framebuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        framebuffer.write_bucket(result);
    }

    log::info!("Rendered in {:.2?}", render_start.elapsed());
    Ok(framebuffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_scenes;
    use yar_core::{Material, SceneDesc};

    fn ground_plane() -> Scene {
        Scene::new(test_scenes::ground_plane()).unwrap()
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb_clamps() {
        assert_eq!(color_to_rgb(Color::new(-1.0, 0.5, 7.0), false), [0, 128, 255]);
        assert_eq!(color_to_rgb(Color::new(f32::NAN, 0.25, 1.0), true), [0, 128, 255]);
    }

    #[test]
    fn test_empty_scene_is_background() {
        let mut desc = SceneDesc::new(test_scenes::camera(6, 4));
        desc.background = Color::new(0.25, 0.5, 1.0);
        let scene = Scene::new(desc).unwrap();

        let fb = render(&scene, &RenderConfig::default()).unwrap();
        assert_eq!((fb.width, fb.height), (6, 4));
        assert!(fb.pixels.iter().all(|&c| c == Color::new(0.25, 0.5, 1.0)));
    }

    #[test]
    fn test_ground_plane_render() {
        let scene = ground_plane();
        let fb = render(&scene, &RenderConfig::default()).unwrap();

        assert_eq!(fb.pixels.len(), 100);
        // Top row looks above the horizon, bottom row sees the lit ground
        assert_eq!(fb.get(5, 0), Color::ZERO);
        let ground = fb.get(5, 9);
        assert!(ground.x > 0.0);
        // One unit light: ambient plus the material's full response is the ceiling
        let Material::BlinnPhong(material) = scene.material_for_mesh(0);
        let ceiling = material.ambient + material.max_response();
        assert!(fb
            .pixels
            .iter()
            .all(|c| c.cmple(ceiling + Color::splat(1e-4)).all()));
        assert!(fb.pixels.iter().all(|c| c.min_element() >= 0.0));
    }

    #[test]
    fn test_same_image_for_any_thread_count_and_bucket_size() {
        let scene = test_scenes::triangle_soup(3, 300);
        let reference = render(
            &scene,
            &RenderConfig {
                threads: Some(1),
                bucket_size: 64,
                ..Default::default()
            },
        )
        .unwrap();

        for (threads, bucket_size) in [(2, 1), (4, 3), (8, 5)] {
            let fb = render(
                &scene,
                &RenderConfig {
                    threads: Some(threads),
                    bucket_size,
                    ..Default::default()
                },
            )
            .unwrap();
            assert_eq!(fb, reference);
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let scene = ground_plane();
        let a = render(&scene, &RenderConfig::default()).unwrap();
        let b = render(&scene, &RenderConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_save_png() {
        let scene = ground_plane();
        let fb = render(&scene, &RenderConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        fb.save_png(&path, true).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (10, 10));
        assert_eq!(img.get_pixel(5, 9).0, color_to_rgb(fb.get(5, 9), true));
    }

    #[test]
    fn test_save_png_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let fb = Framebuffer::new(2, 2);
        assert!(matches!(fb.save_png(&path, false), Err(RenderError::Image(_))));
    }
}
