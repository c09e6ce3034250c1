//! Simple ray tracer example.
//!
//! Builds a small scene with every shape type and saves it as a PNG.
//! Run with `RUST_LOG=info` to see progress.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use ember_renderer::{
    Block, Camera, Cuboid, Cylinder, Drawable, Environment, InfinitePlane, Mat4, Material,
    Projection, RenderConfig, Resolution, Sampler, Scene, Sphere, Torus, Vec3,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scene = build_scene()?;
    let camera = Camera::target(
        Vec3::new(6.0, 3.0, -9.0),
        Vec3::new(0.0, 0.8, 0.0),
        Vec3::Y,
        40.0,
    )
    .with_blur(0.05);

    let config = RenderConfig {
        samples: 32,
        max_depth: 8,
        resolution: Resolution::new(270, 16.0 / 9.0),
        ..RenderConfig::default()
    };

    let done = AtomicUsize::new(0);
    let progress = |_: &Block, _: &[Vec3], total: usize| {
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if finished % 10 == 0 || finished == total {
            log::info!("{}/{} blocks", finished, total);
        }
    };

    let buffer = config.render(&camera, &mut scene, Some(&progress))?;

    let filename = "output.png";
    buffer
        .to_rgb_image(&config.color_model)
        .save(filename)
        .with_context(|| format!("failed to save {}", filename))?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> anyhow::Result<Scene> {
    let sky = Sampler::sky(
        Arc::new(Sampler::solid(Vec3::new(0.3, 0.5, 0.9))),
        Arc::new(Sampler::solid(Vec3::new(0.9, 0.9, 0.85))),
        Arc::new(Sampler::solid(Vec3::splat(20.0))),
        Vec3::new(1.0, 2.0, -1.0),
    );
    let mut scene = Scene::new(Environment::new(Arc::new(sky)));

    let checker = Sampler::checker(
        Arc::new(Sampler::solid(Vec3::splat(0.8))),
        Arc::new(Sampler::solid(Vec3::splat(0.2))),
    );
    let floor = Arc::new(Material::lambertian("floor", checker));
    let red = Arc::new(Material::lambertian("red", Sampler::solid(Vec3::new(0.7, 0.15, 0.1))));
    let mirror = Arc::new(Material::reflect("mirror", Sampler::solid(Vec3::splat(0.9)), 0.05));
    let glass = Arc::new(Material::refract("glass", Sampler::solid(Vec3::ONE), 1.5, 0.0));
    let coated = Arc::new(Material::schlick(
        "coated",
        Arc::new(Material::lambertian("base", Sampler::solid(Vec3::new(0.1, 0.3, 0.7)))),
        Arc::new(Material::reflect("coat", Sampler::solid(Vec3::ONE), 0.0)),
        1.5,
    ));
    let lamp = Arc::new(Material::emissive("lamp", Sampler::solid(Vec3::splat(3.0))));

    scene.push(
        Drawable::new(InfinitePlane::new(Vec3::Y), floor)
            .with_name("floor")
            .with_projection(Projection::PlaneZx),
    );
    scene.push(
        Drawable::new(Sphere::new(1.0), glass)
            .with_name("glass ball")
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))?,
    );
    scene.push(
        Drawable::new(Cuboid::cube(1.2), red)
            .with_transform(
                Mat4::from_translation(Vec3::new(-2.5, 0.6, 0.5)) * Mat4::from_rotation_y(0.6),
            )?,
    );
    scene.push(
        Drawable::new(Cylinder::new(0.7, 0.3, 1.8), mirror)
            .with_transform(Mat4::from_translation(Vec3::new(2.5, 0.9, 0.5)))?,
    );
    scene.push(
        Drawable::new(Torus::new(0.8, 0.25), coated)
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.25, -2.2)))?,
    );
    scene.push(
        Drawable::new(Sphere::new(0.4), lamp)
            .with_transform(Mat4::from_translation(Vec3::new(-1.0, 3.0, 1.5)))?,
    );

    Ok(scene)
}
