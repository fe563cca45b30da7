//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use crate::renderer::render_pixel;
use crate::{Camera, Whitted};
use yar_math::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets covering a `width` x `height` image, center first.
///
/// A bucket size of zero is treated as one.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let dy = b.y as f32 + b.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    // Stable sort keeps row-major order among equidistant buckets
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket. Pixels come back in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, camera: &Camera, integrator: &Whitted) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(camera, integrator, bucket.x + local_x, bucket.y + local_y);
            pixels.push(color);
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_scenes, Bvh};

    fn coverage(buckets: &[Bucket], width: u32, height: u32) -> Vec<u32> {
        let mut hits = vec![0u32; (width * height) as usize];
        for b in buckets {
            for y in b.y..b.y + b.height {
                for x in b.x..b.x + b.width {
                    hits[(y * width + x) as usize] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4);

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 37, 16);
        assert_eq!(buckets.len(), 7 * 3);
        assert!(coverage(&buckets, 100, 37).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_bucket_larger_than_image() {
        let buckets = generate_buckets(10, 10, 64);
        assert_eq!(buckets, vec![Bucket::new(0, 0, 10, 10, 0)]);
    }

    #[test]
    fn test_zero_bucket_size_is_one_pixel() {
        let buckets = generate_buckets(3, 2, 0);
        assert_eq!(buckets.len(), 6);
        assert!(coverage(&buckets, 3, 2).iter().all(|&n| n == 1));
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);

        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);

        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.index, i);
        }
    }

    #[test]
    fn test_render_bucket_matches_pixels() {
        let scene = test_scenes::stacked_quads(&[-2.0]);
        let bvh = Bvh::new(&scene);
        let integrator = Whitted::new(&scene, &bvh);
        let camera = Camera::new(scene.camera());

        let bucket = Bucket::new(2, 3, 4, 2, 0);
        let result = render_bucket(&bucket, &camera, &integrator);

        assert_eq!(result.pixels.len(), 8);
        assert_eq!(result.pixels[0], render_pixel(&camera, &integrator, 2, 3));
        assert_eq!(result.pixels[7], render_pixel(&camera, &integrator, 5, 4));
    }
}
