//! Scene file loading and saving.
//!
//! Scene files are JSON. Variant types (materials, lights, integrator,
//! accelerator) carry a `"type"` tag and vectors are `[x, y, z]` arrays:
//!
//! ```json
//! {
//!   "integrator": { "type": "Whitted", "max_depth": 3 },
//!   "accelerator": { "type": "Bvh", "max_leaf_size": 16 },
//!   "camera": { "width": 10, "height": 10, "focal_length": 5.0,
//!               "look_dir": [0, -0.1, -1], "up_dir": [0, 1, 0], "position": [0, 0.2, 1] },
//!   "materials": [ { "type": "BlinnPhong", "id": "grey", "ambient": [0, 0, 0],
//!                    "diffuse": [0.8, 0.8, 0.8], "specular": [0, 0, 0], "shininess": 1 } ],
//!   "lights": [ { "type": "Point", "position": [4, 10, 10], "intensity": [1, 1, 1] } ],
//!   "meshes": [ { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "triangles": [[0, 1, 2]],
//!                 "smooth": [false], "material": "grey" } ]
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scene::{Scene, SceneDesc, SceneError};

/// Errors that can occur while reading or writing scene files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    Invalid(#[from] SceneError),
}

/// Result type for scene file operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load and validate a scene file.
///
/// # Example
///
/// ```ignore
/// use yar_core::load_scene;
///
/// let scene = load_scene("ground.json")?;
/// println!("{} triangles", scene.total_triangle_count());
/// ```
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    log::info!("Loading scene from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_scene_from_str(&content)
}

/// Parse and validate scene JSON held in memory (useful for testing).
pub fn load_scene_from_str(content: &str) -> LoadResult<Scene> {
    let desc = parse_scene_desc(content)?;
    Ok(Scene::new(desc)?)
}

/// Parse scene JSON without validating it.
pub fn parse_scene_desc(content: &str) -> LoadResult<SceneDesc> {
    Ok(serde_json::from_str(content)?)
}

/// Serialize a scene description to pretty-printed JSON.
pub fn scene_to_string(desc: &SceneDesc) -> LoadResult<String> {
    Ok(serde_json::to_string_pretty(desc)?)
}

/// Write a scene description to disk.
pub fn save_scene<P: AsRef<Path>>(desc: &SceneDesc, path: P) -> LoadResult<()> {
    let path = path.as_ref();
    let json = scene_to_string(desc)?;

    std::fs::write(path, json).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Wrote scene to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Accelerator, Falloff, Integrator, Light, Material};
    use yar_math::Vec3;

    const GROUND: &str = r#"{
        "integrator": { "type": "Whitted", "max_depth": 3 },
        "accelerator": { "type": "Bvh", "max_leaf_size": 16 },
        "camera": {
            "width": 10, "height": 10, "focal_length": 5.0,
            "look_dir": [0, -0.1, -1], "up_dir": [0, 1, 0], "position": [0, 0.2, 1]
        },
        "materials": [{
            "type": "BlinnPhong", "id": "testmat",
            "ambient": [0, 0, 0], "diffuse": [0.8, 0.8, 0.8], "specular": [0, 0, 0],
            "shininess": 1
        }],
        "lights": [{ "type": "Point", "position": [4, 10, 10], "intensity": [1, 1, 1] }],
        "meshes": [{
            "vertices": [[-1000, -2.2, -1000], [1000, -2.2, -1000], [1000, -2.2, 1000], [-1000, -2.2, 1000]],
            "normals": [[0, 1, 0], [0, 1, 0], [0, 1, 0], [0, 1, 0]],
            "triangles": [[0, 1, 2], [0, 2, 3]],
            "smooth": [true, false],
            "material": "testmat"
        }]
    }"#;

    #[test]
    fn test_load_scene_from_str() {
        let scene = load_scene_from_str(GROUND).unwrap();

        assert_eq!(scene.integrator(), Integrator::Whitted { max_depth: 3 });
        assert_eq!(scene.accelerator(), Accelerator::Bvh { max_leaf_size: 16 });
        assert_eq!(scene.camera().width, 10);
        assert_eq!(scene.total_triangle_count(), 2);

        let Material::BlinnPhong(material) = scene.material_for_mesh(0);
        assert_eq!(material.reflectivity, 0.0);

        let Light::Point(light) = &scene.lights()[0];
        assert_eq!(light.position, Vec3::new(4.0, 10.0, 10.0));
        assert_eq!(light.falloff, Falloff::Constant);
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let desc = parse_scene_desc(
            r#"{ "camera": { "width": 4, "height": 2, "focal_length": 1.0,
                 "look_dir": [0, 0, -1], "up_dir": [0, 1, 0], "position": [0, 0, 0] } }"#,
        )
        .unwrap();

        assert_eq!(desc.integrator, Integrator::default());
        assert_eq!(desc.accelerator, Accelerator::default());
        assert!(desc.meshes.is_empty());
        assert!(Scene::new(desc).is_ok());
    }

    #[test]
    fn test_invalid_scene_is_reported() {
        let broken = GROUND.replace(r#""material": "testmat""#, r#""material": "nope""#);

        match load_scene_from_str(&broken) {
            Err(LoadError::Invalid(SceneError::UnknownMaterial { material, .. })) => {
                assert_eq!(material, "nope")
            }
            other => panic!("expected unknown material, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            load_scene_from_str("{ not json"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_scene("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_save_and_load_file() {
        let _ = env_logger::builder().is_test(true).try_init();

        let desc = parse_scene_desc(GROUND).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        save_scene(&desc, &path).unwrap();
        let scene = load_scene(&path).unwrap();

        assert_eq!(scene.to_desc(), desc);
    }
}
