//! Sphere primitive for ray tracing.

use crate::{HitRecord, Hittable, MaterialId, Ray};
use cdrt_math::{Aabb, Interval, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Both roots of `|O + tD - C|^2 = r^2`, smaller first, or `None` on a miss.
    fn roots(&self, ray: &Ray) -> Option<(f32, f32)> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let h = half_b * half_b - a * c;
        if h < 0.0 {
            return None;
        }

        let sqrt_h = h.sqrt();
        Some(((-half_b - sqrt_h) / a, (-half_b + sqrt_h) / a))
    }

    fn record(&self, ray: &Ray, t: f32) -> HitRecord {
        let outward_normal = (ray.at(t) - self.center) / self.radius;
        HitRecord::new(ray, t, outward_normal, self.material)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let (near, far) = self.roots(ray)?;

        // Find the nearest root in the acceptable range
        let t = if ray_t.contains(near) {
            near
        } else if ray_t.contains(far) {
            far
        } else {
            return None;
        };

        Some(self.record(ray, t))
    }

    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        let Some((near, far)) = self.roots(ray) else {
            return;
        };

        if ray_t.contains(near) {
            hits.push(self.record(ray, near));
        }
        // A tangent ray touches once
        if far != near && ray_t.contains(far) {
            hits.push(self.record(ray, far));
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0))
    }

    #[test]
    fn test_sphere_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = unit_sphere()
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .unwrap();

        assert!((rec.t - 0.5).abs() < 1e-4);
        assert!((rec.p - ray.at(rec.t)).length() < 1e-5);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        let rec = unit_sphere()
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .unwrap();

        assert!((rec.t - 0.125).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = unit_sphere()
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .unwrap();

        assert!((rec.t - 0.5).abs() < 1e-4);
        assert!(!rec.front_face);
        assert!(ray.direction().dot(rec.normal) <= 0.0);
    }

    #[test]
    fn test_sphere_miss() {
        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(unit_sphere()
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_sphere_hit_all_counts() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, MaterialId(0));
        let ray_t = Interval::new(0.001, f32::INFINITY);

        let mut hits = Vec::new();
        sphere.hit_all(&Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z), ray_t, &mut hits);
        assert!(hits.is_empty());

        // Grazing ray touches exactly once
        sphere.hit_all(&Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z), ray_t, &mut hits);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 5.0).abs() < 1e-4);

        hits.clear();
        sphere.hit_all(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z), ray_t, &mut hits);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].t < hits[1].t);
        assert!((hits[0].t - 4.0).abs() < 1e-4);
        assert!((hits[1].t - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_hit_all_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, MaterialId(0));
        let mut hits = Vec::new();
        sphere.hit_all(
            &Ray::new(Vec3::ZERO, Vec3::Z),
            Interval::new(0.001, f32::INFINITY),
            &mut hits,
        );

        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 1.0).abs() < 1e-4);
    }
}
