//! Small scenes shared by the renderer's unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yar_core::{
    BlinnPhong, CameraDesc, Light, Material, PointLight, Scene, SceneDesc, TriangleMesh,
};
use yar_math::{Color, Vec3};

pub fn camera(width: u32, height: u32) -> CameraDesc {
    CameraDesc {
        width,
        height,
        focal_length: 1.0,
        look_dir: Vec3::NEG_Z,
        up_dir: Vec3::Y,
        position: Vec3::ZERO,
    }
}

pub fn grey() -> Material {
    Material::BlinnPhong(BlinnPhong::new(
        "grey",
        Color::splat(0.1),
        Color::splat(0.6),
        Color::splat(0.3),
        16.0,
    ))
}

pub fn empty() -> Scene {
    Scene::new(SceneDesc::new(camera(4, 4))).unwrap()
}

/// Unit quad at z, facing +Z.
pub fn quad(z: f32, material: &str) -> TriangleMesh {
    TriangleMesh::flat(
        vec![
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
        material,
    )
}

/// One quad per entry of `depths`, in that mesh order, lit from the camera.
pub fn stacked_quads(depths: &[f32]) -> Scene {
    let mut desc = SceneDesc::new(camera(8, 8));
    desc.materials.push(grey());
    desc.lights
        .push(Light::Point(PointLight::new(Vec3::new(0.0, 0.0, 1.0), Color::ONE)));
    desc.meshes = depths.iter().map(|&z| quad(z, "grey")).collect();
    Scene::new(desc).unwrap()
}

/// `count` random triangles around the origin, split over several meshes.
pub fn triangle_soup(seed: u64, count: usize) -> Scene {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut desc = SceneDesc::new(camera(8, 8));
    desc.materials.push(grey());

    let mut remaining = count;
    while remaining > 0 {
        let batch = remaining.min(50);
        let mut vertices = Vec::with_capacity(batch * 3);
        for _ in 0..batch {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            for _ in 0..3 {
                vertices.push(
                    center
                        + Vec3::new(
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                            rng.gen_range(-1.5..1.5),
                        ),
                );
            }
        }
        let triangles = (0..batch as u32).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();
        desc.meshes.push(TriangleMesh::flat(vertices, triangles, "grey"));
        remaining -= batch;
    }

    Scene::new(desc).unwrap()
}

/// The 10x10 ground plane scene: one two-triangle plane, one light.
pub fn ground_plane() -> SceneDesc {
    let mut desc = SceneDesc::new(CameraDesc {
        width: 10,
        height: 10,
        focal_length: 5.0,
        look_dir: Vec3::new(0.0, -0.1, -1.0),
        up_dir: Vec3::Y,
        position: Vec3::new(0.0, 0.2, 1.0),
    });
    desc.integrator = yar_core::Integrator::Whitted { max_depth: 3 };
    desc.accelerator = yar_core::Accelerator::Bvh { max_leaf_size: 16 };
    desc.materials.push(Material::BlinnPhong(BlinnPhong::new(
        "testmat",
        Color::ZERO,
        Color::splat(0.8),
        Color::ZERO,
        1.0,
    )));
    desc.lights.push(Light::Point(PointLight::new(
        Vec3::new(4.0, 10.0, 10.0),
        Color::ONE,
    )));
    desc.meshes.push(TriangleMesh::new(
        vec![
            Vec3::new(-1000.0, -2.2, -1000.0),
            Vec3::new(1000.0, -2.2, -1000.0),
            Vec3::new(1000.0, -2.2, 1000.0),
            Vec3::new(-1000.0, -2.2, 1000.0),
        ],
        Some(vec![Vec3::Y; 4]),
        vec![[0, 1, 2], [0, 2, 3]],
        vec![true, false],
        "testmat",
    ));
    desc
}
