//! CDRT Renderer - CPU convolution-domain ray tracing
//!
//! Geometric intersection engine (primitives, hittable collections, BVH)
//! plus two interchangeable integrators:
//!
//! - **Convolution**: shades hits from occlusion-interval measurements
//!   along rays aimed at the light
//! - **Path tracing**: depth-limited recursive scatter with a sky gradient
//!
//! # Example
//!
//! ```ignore
//! use cdrt_renderer::*;
//!
//! let settings = RenderSettings::default();
//! let mut builder = SceneBuilder::new();
//! let white = builder.add_material(Lambertian::new(Color::ONE));
//! builder.add(Sphere::new(Vec3::ZERO, 0.5, white));
//! builder.set_light(Light::point(Vec3::Y, Color::ONE));
//! let scene = builder.build(&settings.bvh)?;
//!
//! let camera = Camera::new(45.0, settings.aspect_ratio());
//! let renderer = Renderer::new(scene, camera, settings)?;
//! renderer.render(&CancelToken::new())?;
//! let rgb = renderer.last_render();
//! ```

mod bucket;
pub mod bvh;
mod camera;
mod convolution;
mod hittable;
mod integrator;
mod light;
mod material;
mod mesh;
mod path_tracer;
mod plane;
mod primitive;
mod renderer;
mod scene;
mod settings;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use bvh::{Bvh, BvhConfig, BvhNode};
pub use camera::Camera;
pub use convolution::ConvolutionIntegrator;
pub use hittable::{AcceleratedList, HitRecord, Hittable, HittableList, MaterialId, PrimitiveId};
pub use integrator::{Integrator, IntegratorKind};
pub use light::Light;
pub use material::{Color, Glass, Lambertian, Material, Metal, ScatterResult};
pub use mesh::Mesh;
pub use path_tracer::{sky_gradient, PathTracer};
pub use plane::Plane;
pub use primitive::Primitive;
pub use renderer::{
    linear_to_gamma, render_pixel, CancelToken, RenderContext, RenderError, RenderStats, Renderer,
};
pub use scene::{Scene, SceneBuilder, SceneError};
pub use settings::{ConvolutionParams, RenderSettings, SettingsError, DEFAULT_BUCKET_SIZE};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from cdrt_math
pub use cdrt_math::{Aabb, Interval, Ray, Vec3};

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn rand::RngCore) -> f32 {
    use rand::Rng;
    rng.gen()
}
