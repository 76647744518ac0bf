//! Recursive Monte Carlo path tracer.
//!
//! Depth-limited scatter/attenuate recursion with a sky gradient on miss.
//! Shares the intersection engine with the convolution integrator.

use cdrt_math::Interval;
use rand::RngCore;

use crate::{Color, Integrator, Ray, Scene};

/// Minimum hit distance for path-traced bounces.
const T_MIN: f32 = 1e-5;

#[derive(Debug, Clone, Copy)]
pub struct PathTracer {
    max_depth: u32,
}

impl PathTracer {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Compute the color seen by a ray with `depth` bounces left.
    pub fn ray_color(&self, ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
        // If we've exceeded max depth, return black (no light)
        if depth == 0 {
            return Color::ZERO;
        }

        let Some(rec) = scene.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return sky_gradient(ray);
        };

        match scene.material(rec.material).scatter(ray, &rec, rng) {
            Some(result) => {
                result.attenuation * self.ray_color(&result.scattered, scene, depth - 1, rng)
            }
            // Absorbed
            None => Color::ZERO,
        }
    }
}

impl Integrator for PathTracer {
    fn radiance(&self, ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color {
        self.ray_color(ray, scene, self.max_depth, rng)
    }

    fn name(&self) -> &'static str {
        "path_trace"
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::BvhConfig;
    use crate::{Lambertian, Light, Metal, SceneBuilder, Sphere};
    use cdrt_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene_with<F: FnOnce(&mut SceneBuilder)>(fill: F) -> Scene {
        let mut builder = SceneBuilder::new();
        fill(&mut builder);
        builder.set_light(Light::point(Vec3::Y, Color::ONE));
        builder.build(&BvhConfig::default()).unwrap()
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::Y));
        let down_color = sky_gradient(&Ray::new(Vec3::ZERO, -Vec3::Y));

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_miss_returns_sky() {
        let scene = scene_with(|_| {});
        let tracer = PathTracer::new(10);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0));

        assert_eq!(tracer.radiance(&ray, &scene, &mut rng), sky_gradient(&ray));
    }

    #[test]
    fn test_zero_depth_is_black() {
        let scene = scene_with(|_| {});
        let tracer = PathTracer::new(0);
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(
            tracer.radiance(&Ray::new(Vec3::ZERO, Vec3::Y), &scene, &mut rng),
            Color::ZERO
        );
    }

    #[test]
    fn test_mirror_reflects_sky() {
        // Ray straight down onto a perfect mirror bounces straight up
        let scene = scene_with(|b| {
            let mirror = b.add_material(Metal::new(Color::new(0.5, 0.5, 0.5), 0.0));
            b.add(Sphere::new(Vec3::new(0.0, -2.0, 0.0), 1.0, mirror));
        });
        let tracer = PathTracer::new(10);
        let mut rng = StdRng::seed_from_u64(42);

        let color = tracer.radiance(&Ray::new(Vec3::ZERO, -Vec3::Y), &scene, &mut rng);
        let expected = Color::new(0.5, 0.7, 1.0) * 0.5;
        assert!((color - expected).length() < 1e-4);
    }

    #[test]
    fn test_diffuse_hit_is_attenuated() {
        let scene = scene_with(|b| {
            let grey = b.add_material(Lambertian::new(Color::splat(0.5)));
            b.add(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, grey));
        });
        let tracer = PathTracer::new(10);
        let mut rng = StdRng::seed_from_u64(42);

        let color = tracer.radiance(&Ray::new(Vec3::ZERO, -Vec3::Z), &scene, &mut rng);
        assert!(color.max_element() <= 0.5 + 1e-6);
        assert!(color.min_element() >= 0.0);
    }
}
