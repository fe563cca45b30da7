//! Pinhole camera for primary ray generation.

use yar_core::CameraDesc;
use yar_math::{Ray, Vec3};

/// Camera for generating primary rays into the scene.
///
/// The image plane sits `focal_length` in front of the eye and spans
/// [-1, 1] vertically and [-aspect, aspect] horizontally. Pixel (0, 0) is
/// the top-left corner of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    position: Vec3,
    focal_length: f32,
    aspect: f32,

    // Orthonormal basis
    forward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    /// Derive the camera basis from a validated description.
    pub fn new(desc: &CameraDesc) -> Self {
        let forward = desc.look_dir.try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward
            .cross(desc.up_dir)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        let up = right.cross(forward);

        Self {
            image_width: desc.width,
            image_height: desc.height,
            position: desc.position,
            focal_length: desc.focal_length,
            aspect: desc.width as f32 / desc.height.max(1) as f32,
            forward,
            right,
            up,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Right, up and forward axes.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.right, self.up, self.forward)
    }

    /// Generate the ray through the centre of pixel (x, y).
    pub fn ray_for_pixel(&self, x: u32, y: u32) -> Ray {
        let u = (2.0 * (x as f32 + 0.5) / self.image_width as f32 - 1.0) * self.aspect;
        let v = 1.0 - 2.0 * (y as f32 + 0.5) / self.image_height as f32;

        let direction = self.forward * self.focal_length + self.right * u + self.up * v;
        Ray::new(self.position, direction.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(width: u32, height: u32) -> CameraDesc {
        CameraDesc {
            width,
            height,
            focal_length: 1.0,
            look_dir: Vec3::new(0.0, 0.0, -2.0),
            up_dir: Vec3::Y,
            position: Vec3::new(1.0, 2.0, 3.0),
        }
    }

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new(&desc(4, 4));
        let (right, up, forward) = camera.basis();

        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((right - Vec3::X).length() < 1e-6);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_basis_is_orthonormal_for_tilted_view() {
        let mut tilted = desc(10, 10);
        tilted.look_dir = Vec3::new(0.0, -0.1, -1.0);
        let (right, up, forward) = Camera::new(&tilted).basis();

        assert!(right.dot(up).abs() < 1e-6);
        assert!(right.dot(forward).abs() < 1e-6);
        assert!(up.dot(forward).abs() < 1e-6);
        assert!((up.length() - 1.0).abs() < 1e-6);
        // Up stays on the same side as the requested up direction
        assert!(up.y > 0.9);
    }

    #[test]
    fn test_rays_start_at_eye_and_are_normalized() {
        let camera = Camera::new(&desc(7, 5));
        for (x, y) in [(0, 0), (6, 4), (3, 2)] {
            let ray = camera.ray_for_pixel(x, y);
            assert_eq!(ray.origin, camera.position());
            assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_centre_pixel_looks_forward() {
        let camera = Camera::new(&desc(5, 5));
        let ray = camera.ray_for_pixel(2, 2);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_pixel_orientation() {
        let camera = Camera::new(&desc(4, 4));

        let top_left = camera.ray_for_pixel(0, 0).direction;
        assert!(top_left.x < 0.0 && top_left.y > 0.0);

        let bottom_right = camera.ray_for_pixel(3, 3).direction;
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn test_aspect_ratio_widens_horizontally() {
        let camera = Camera::new(&desc(20, 10));

        // Image-plane coordinates of the corner pixel centres
        let corner = camera.ray_for_pixel(0, 0).direction;
        let plane = corner / -corner.z;
        assert!((plane.x - (-1.9)).abs() < 1e-5);
        assert!((plane.y - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_ray_generation_is_deterministic() {
        let a = Camera::new(&desc(9, 3));
        let b = Camera::new(&desc(9, 3));
        assert_eq!(a.ray_for_pixel(4, 1), b.ray_for_pixel(4, 1));
    }
}
