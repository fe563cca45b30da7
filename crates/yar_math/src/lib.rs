// Re-export glam for convenience
pub use glam::*;

// yar math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// RGB colour, linear, one f32 per channel.
pub type Color = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_cross_is_right_handed() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_zero_vector_does_not_normalize() {
        assert!(Vec3::ZERO.try_normalize().is_none());
        let n = Vec3::new(0.0, 3.0, 4.0).try_normalize().unwrap();
        assert!((n - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }
}
