//! yar renderer: a Whitted-style CPU ray tracer over triangle meshes.
//!
//! The pipeline is scene -> [`Bvh`] -> [`Camera`] rays -> [`Whitted`]
//! shading -> [`Framebuffer`], driven bucket by bucket on a rayon pool.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod integrator;
mod renderer;
mod triangle;

#[cfg(test)]
mod test_scenes;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, BvhStats};
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, LinearScan};
pub use integrator::{Whitted, HIT_EPSILON, SHADOW_BIAS};
pub use renderer::{
    color_to_rgb, render, render_pixel, Framebuffer, RenderConfig, RenderError,
};
pub use triangle::{Triangle, TriangleRef};
