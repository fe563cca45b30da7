//! yar core - scene description for the yar ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `SceneDesc`, `Scene`, `TriangleMesh`, `Material`, `Light`
//! - **Validation**: `Scene::new` turns a description into a render-ready scene
//!   or a `SceneError`
//! - **Scene files**: JSON loading and saving
//!
//! # Example
//!
//! ```ignore
//! use yar_core::load_scene;
//!
//! let scene = load_scene("scene.json")?;
//! println!("Loaded {} meshes, {} lights",
//!     scene.meshes().len(),
//!     scene.lights().len());
//! ```

pub mod io;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use io::{load_scene, load_scene_from_str, parse_scene_desc, save_scene, scene_to_string, LoadError};
pub use mesh::TriangleMesh;
pub use scene::{
    Accelerator, BlinnPhong, CameraDesc, Falloff, Integrator, Light, Material, PointLight, Scene,
    SceneDesc, SceneError, MAX_TRACE_DEPTH,
};
