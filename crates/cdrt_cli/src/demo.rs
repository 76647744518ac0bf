//! The demo scene: a croissant on a floor patch surrounded by spheres.

use std::path::Path;

use cdrt_math::Vec3;
use cdrt_renderer::{
    Camera, Color, Lambertian, Light, Mesh, Metal, Plane, RenderSettings, Scene, SceneBuilder,
    SceneError, Sphere,
};

/// Build the demo scene, loading `mesh` if given.
///
/// A mesh that fails to load is skipped with a warning.
pub fn build_scene(settings: &RenderSettings, mesh: Option<&Path>) -> Result<Scene, SceneError> {
    let mut builder = SceneBuilder::new();

    let white = builder.add_material(Lambertian::new(Color::ONE));
    let brown = builder.add_material(Lambertian::new(Color::new(0.92, 0.59, 0.17)));
    let metal_white = builder.add_material(Metal::new(Color::ONE, 0.0));
    let metal_blue = builder.add_material(Metal::new(Color::new(0.2, 0.3, 0.8), 0.0));
    let metal_rose = builder.add_material(Metal::new(Color::new(0.8, 0.3, 0.2), 0.2));

    if let Some(path) = mesh {
        let mut croissant = Mesh::new(brown);
        match croissant.load(path, &settings.bvh) {
            Ok(()) => {
                log::info!(
                    "Loaded mesh {} ({} triangles)",
                    path.display(),
                    croissant.triangle_count()
                );
                builder.add(croissant);
            }
            Err(e) => log::warn!("Skipping mesh {}: {}", path.display(), e),
        }
    }

    let spheres = [
        (Vec3::new(0.1, 0.097, 0.3), 0.15, white),
        (Vec3::new(0.35, 0.07, 0.18), 0.12, metal_rose),
        (Vec3::new(-0.2, 0.3, 0.02), 0.15, metal_white),
        (Vec3::new(0.18, 0.025, -0.15), 0.1, metal_rose),
        (Vec3::new(-0.155, 0.06, 0.23), 0.11, metal_blue),
        (Vec3::new(0.07, 0.3, -0.05), 0.1, metal_blue),
    ];
    for (center, radius, material) in spheres {
        builder.add(Sphere::new(center, radius, material));
    }

    // Floor
    builder.add(Plane::new(
        Vec3::new(0.0, -0.1, 0.0),
        Vec3::Y,
        Vec3::new(0.0, 0.0, -1.0),
        1.0,
        1.0,
        white,
    ));

    builder.set_light(Light::point(Vec3::new(0.0, 1.0, 0.0), Color::ONE));
    builder.build(&settings.bvh)
}

/// Camera framing the demo scene.
pub fn camera(settings: &RenderSettings) -> Camera {
    Camera::new(45.0, settings.aspect_ratio()).with_position(
        Vec3::new(0.0, 0.65, -1.0),
        Vec3::ZERO,
        Vec3::Y,
    )
}
