//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{HitRecord, Hittable, MaterialId, Ray};
use cdrt_math::{Aabb, Interval, Vec3, EPSILON};

/// A flat-shaded triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    /// Material
    material: MaterialId,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The normal follows counter-clockwise winding. Zero-area triangles
    /// get `+Y` as their normal and are never hit.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).try_normalize().unwrap_or(Vec3::Y);
        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle, or the triangle is degenerate
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);

        if u < 0.0 || v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material))
    }

    /// A ray crosses a triangle at most once.
    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        if let Some(rec) = self.hit(ray, ray_t) {
            hits.push(rec);
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
