//! Convolution-domain integrator.
//!
//! Instead of sampling BSDFs recursively, each camera hit is shaded from
//! occlusion-interval measurements along a "D/R" ray aimed at the light:
//!
//! 1. **R0**: how much of the D/R ray stays inside the object that was hit.
//! 2. **RN**: how much of it passes through every other primitive, coupled
//!    with the light energy seen along the ray.
//! 3. The two are combined into `cosDR = K_DIG / (R0 + RN + ε)`, shaped by a
//!    power curve and multiplied by the material albedo.

use cdrt_math::{Interval, EPSILON};
use rand::RngCore;

use crate::{
    Color, ConvolutionParams, HitRecord, Hittable, Integrator, Primitive, Ray, Scene,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvolutionIntegrator {
    params: ConvolutionParams,
}

impl ConvolutionIntegrator {
    pub fn new(params: ConvolutionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ConvolutionParams {
        &self.params
    }

    /// Sum of the `(enter, exit)` spans described by sorted hit distances.
    ///
    /// Hits alternate between entering and leaving the object. When the ray
    /// starts inside, the first span runs from `t = 0` to the first hit.
    pub fn occlusion_interval_sum<I>(ts: I, starts_inside: bool) -> f32
    where
        I: IntoIterator<Item = f32>,
    {
        let mut sum = 0.0;
        let mut t_start = 0.0;
        let mut inside = starts_inside;

        for t in ts {
            if inside {
                sum += t - t_start;
            } else {
                t_start = t;
            }
            inside = !inside;
        }
        sum
    }

    /// D/R ray from just below the hit surface towards `target`.
    pub fn secondary_ray(&self, rec: &HitRecord, target: cdrt_math::Vec3) -> Ray {
        let origin = rec.p - rec.normal * self.params.k_dig;
        Ray::towards(origin, target)
    }

    /// Occlusion length of `ray` through a single primitive.
    ///
    /// `scratch` is cleared and reused for the hit list.
    fn occlusion(
        ray: &Ray,
        primitive: &Primitive,
        starts_inside: bool,
        scratch: &mut Vec<HitRecord>,
    ) -> f32 {
        scratch.clear();
        primitive.hit_all(ray, Interval::new(EPSILON, f32::INFINITY), scratch);
        scratch.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self::occlusion_interval_sum(scratch.iter().map(|rec| rec.t), starts_inside)
    }

    /// Map weighted R0/RN terms to the scalar applied to the albedo.
    pub fn shade_factor(&self, r0: f32, rn: f32) -> f32 {
        let p = &self.params;
        let cos_dr = p.k_dig / (r0 * p.k_r0 + rn * p.k_rn + EPSILON);
        (cos_dr * p.k_total_dr_s).powf(p.exp_total_dr_s)
    }

    /// Raw `(R0, RN)` terms for a primary hit, before weighting.
    pub fn terms(&self, rec: &HitRecord, scene: &Scene) -> (f32, f32) {
        let light = scene.light();
        let dr_ray = self.secondary_ray(rec, light.origin());
        let mut scratch = Vec::new();

        // Self-occlusion: the ray starts inside the surface it was dug into
        let r0 = rec
            .object
            .and_then(|id| scene.primitive(id))
            .map_or(0.0, |hit_object| {
                Self::occlusion(&dr_ray, hit_object, true, &mut scratch)
            });

        // Every other primitive is measured along the same ray, so the light
        // energy is the same for all of them. The running total is multiplied
        // on each step, which makes RN depend on primitive order.
        let light_energy = light.intensity_from_ray(&dr_ray);
        let mut rn = 0.0;
        for (id, primitive) in scene.primitives() {
            if Some(id) == rec.object {
                continue;
            }
            rn += Self::occlusion(&dr_ray, primitive, false, &mut scratch);
            rn *= light_energy;
        }

        (r0, rn)
    }
}

impl Integrator for ConvolutionIntegrator {
    fn radiance(&self, ray: &Ray, scene: &Scene, _rng: &mut dyn RngCore) -> Color {
        let Some(rec) = scene.hit(ray, Interval::new(EPSILON, f32::INFINITY)) else {
            return Color::ZERO;
        };

        let (r0, rn) = self.terms(&rec, scene);
        scene.material(rec.material).albedo() * self.shade_factor(r0, rn)
    }

    fn name(&self) -> &'static str {
        "convolution"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::BvhConfig;
    use crate::{Lambertian, Light, Plane, SceneBuilder, Sphere};
    use cdrt_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_interval_sum_outside_pairs_enter_exit() {
        let sum = ConvolutionIntegrator::occlusion_interval_sum([1.5, 2.25], false);
        assert_eq!(sum, 0.75);
    }

    #[test]
    fn test_interval_sum_inside_measures_from_origin() {
        // Starting inside, the first hit closes the span opened at t = 0
        let sum = ConvolutionIntegrator::occlusion_interval_sum([0.5], true);
        assert_eq!(sum, 0.5);

        // A second hit only reopens an interval that never closes
        let sum = ConvolutionIntegrator::occlusion_interval_sum([0.5, 2.0], true);
        assert_eq!(sum, 0.5);
    }

    #[test]
    fn test_interval_sum_multiple_spans() {
        let sum = ConvolutionIntegrator::occlusion_interval_sum([1.0, 2.0, 4.0, 7.0], false);
        assert_eq!(sum, 4.0);
        assert_eq!(
            ConvolutionIntegrator::occlusion_interval_sum(std::iter::empty(), true),
            0.0
        );
    }

    #[test]
    fn test_shade_factor_defaults() {
        let integrator = ConvolutionIntegrator::default();

        // R0 equal to the dig depth gives roughly full brightness
        let lit = integrator.shade_factor(0.001, 0.0);
        assert!((lit - 1.0).abs() < 1e-4);

        // Thicker occlusion darkens
        assert!(integrator.shade_factor(0.1, 0.0) < lit);
        // RN is weighted by k_rn
        let rn_only = integrator.shade_factor(0.0, 0.02);
        assert!((rn_only - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shade_factor_power_curve() {
        let integrator = ConvolutionIntegrator::new(ConvolutionParams {
            k_dig: 1.0,
            k_r0: 1.0,
            k_rn: 1.0,
            k_total_dr_s: 2.0,
            exp_total_dr_s: 2.0,
        });
        // (1 / 1 * 2)^2
        assert!((integrator.shade_factor(1.0, 0.0) - 4.0).abs() < 1e-4);
    }

    fn sphere_scene(extra: Option<Sphere>) -> Scene {
        let mut builder = SceneBuilder::new();
        let white = builder.add_material(Lambertian::new(Color::ONE));
        builder.add(Sphere::new(Vec3::ZERO, 0.5, white));
        if let Some(sphere) = extra {
            builder.add(sphere);
        }
        builder.set_light(Light::point(Vec3::new(0.0, 0.0, -2.0), Color::ONE));
        builder.build(&BvhConfig::default()).unwrap()
    }

    #[test]
    fn test_lit_front_of_sphere() {
        let scene = sphere_scene(None);
        let integrator = ConvolutionIntegrator::default();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let rec = scene.hit(&ray, Interval::new(EPSILON, f32::INFINITY)).unwrap();
        let (r0, rn) = integrator.terms(&rec, &scene);

        // The D/R ray leaves the sphere after the dig depth
        assert!((r0 - 0.001).abs() < 1e-5);
        assert_eq!(rn, 0.0);

        let color = integrator.radiance(&ray, &scene, &mut rng);
        assert!(color.min_element() > 0.9);
    }

    #[test]
    fn test_miss_is_black() {
        let scene = sphere_scene(None);
        let integrator = ConvolutionIntegrator::default();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), -Vec3::Z);
        assert_eq!(integrator.radiance(&ray, &scene, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_blocker_adds_rn() {
        // A second sphere between the hit point and the light
        let blocker = Sphere::new(Vec3::new(0.0, 0.0, -1.25), 0.25, crate::MaterialId(0));
        let scene = sphere_scene(Some(blocker));
        let integrator = ConvolutionIntegrator::default();

        // Hit the first sphere from the side the light is on, past the blocker
        let ray = Ray::new(Vec3::new(0.0, 0.0, -0.75), Vec3::Z);
        let rec = scene.hit(&ray, Interval::new(EPSILON, f32::INFINITY)).unwrap();
        assert_eq!(rec.object, Some(crate::PrimitiveId(0)));

        let (_, rn) = integrator.terms(&rec, &scene);
        // Full chord of the blocker, times a white light's unit energy
        assert!((rn - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_edge_on_area_light_zeroes_rn() {
        let mut builder = SceneBuilder::new();
        let white = builder.add_material(Lambertian::new(Color::ONE));
        builder.add(Sphere::new(Vec3::ZERO, 0.5, white));
        builder.add(Sphere::new(Vec3::new(0.0, 0.0, -1.25), 0.25, white));
        // Patch seen exactly edge-on from the hit point, so no energy arrives
        let patch = Plane::new(Vec3::new(0.0, 0.0, -2.0), Vec3::X, Vec3::Y, 1.0, 1.0, white);
        builder.set_light(Light::area(patch, Color::ONE));
        let scene = builder.build(&BvhConfig::default()).unwrap();

        let integrator = ConvolutionIntegrator::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -0.75), Vec3::Z);
        let rec = scene.hit(&ray, Interval::new(EPSILON, f32::INFINITY)).unwrap();

        let (r0, rn) = integrator.terms(&rec, &scene);
        assert!(r0 > 0.0);
        assert_eq!(rn, 0.0);
    }
}
