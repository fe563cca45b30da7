//! Simple ray tracer example.
//!
//! Builds a mirrored pyramid on a ground plane in code and saves it as PNG.

use std::error::Error;

use yar_core::{
    BlinnPhong, CameraDesc, Falloff, Integrator, Light, Material, PointLight, Scene, SceneDesc,
    TriangleMesh,
};
use yar_math::{Color, Vec3};
use yar_renderer::{render, RenderConfig};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let scene = Scene::new(build_scene())?;

    let config = RenderConfig {
        gamma: true,
        ..Default::default()
    };
    let image = render(&scene, &config)?;

    let filename = "output.png";
    image.save_png(filename, config.gamma)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> SceneDesc {
    let mut desc = SceneDesc::new(CameraDesc {
        width: 640,
        height: 360,
        focal_length: 2.0,
        look_dir: Vec3::new(0.0, -0.35, -1.0),
        up_dir: Vec3::Y,
        position: Vec3::new(0.0, 2.0, 6.0),
    });
    desc.integrator = Integrator::Whitted { max_depth: 4 };
    desc.background = Color::new(0.5, 0.7, 1.0);

    desc.materials.push(Material::BlinnPhong(BlinnPhong::new(
        "ground",
        Color::splat(0.05),
        Color::new(0.45, 0.45, 0.4),
        Color::ZERO,
        1.0,
    )));
    desc.materials.push(Material::BlinnPhong(
        BlinnPhong::new(
            "mirror",
            Color::new(0.02, 0.0, 0.0),
            Color::new(0.3, 0.05, 0.05),
            Color::splat(0.6),
            64.0,
        )
        .with_reflectivity(0.6),
    ));

    desc.lights.push(Light::Point(PointLight::new(
        Vec3::new(-4.0, 8.0, 6.0),
        Color::splat(0.8),
    )));
    desc.lights.push(Light::Point(
        PointLight::new(Vec3::new(3.0, 2.0, 2.0), Color::new(6.0, 5.0, 4.0))
            .with_falloff(Falloff::InverseSquare),
    ));

    desc.meshes.push(TriangleMesh::flat(
        vec![
            Vec3::new(-50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, -50.0),
            Vec3::new(-50.0, 0.0, -50.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
        "ground",
    ));

    // Square pyramid, counter-clockwise faces seen from outside
    desc.meshes.push(TriangleMesh::flat(
        vec![
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 1.6, 0.0),
        ],
        vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]],
        "mirror",
    ));

    desc
}
