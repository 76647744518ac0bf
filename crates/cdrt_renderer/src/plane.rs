//! Finite rectangular plane patch.

use crate::{HitRecord, Hittable, MaterialId, Ray};
use cdrt_math::{Aabb, Interval, Vec3, EPSILON};

/// A rectangle of size `sx` × `sy` centred on `origin`.
///
/// The local basis is `vz` = normal, `vy` = up (made orthogonal to the
/// normal) and `vx` = `vz × vy`. A hit is accepted when its local
/// coordinates lie in `[-size/2, size/2)` on both axes; the upper bound is
/// open so that tiled patches never both claim a shared edge.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Vec3,
    vx: Vec3,
    vy: Vec3,
    vz: Vec3,
    sx: f32,
    sy: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Plane {
    pub fn new(origin: Vec3, normal: Vec3, up: Vec3, sx: f32, sy: f32, material: MaterialId) -> Self {
        let vz = normal.try_normalize().unwrap_or(Vec3::Y);
        let vx = vz
            .cross(up)
            .try_normalize()
            .unwrap_or_else(|| vz.any_orthonormal_vector());
        let vy = vx.cross(vz);

        let half_x = vx * sx * 0.5;
        let half_y = vy * sy * 0.5;
        let thickness = vz * EPSILON;
        let bbox = Aabb::from_point_cloud(&[
            origin - half_x - half_y - thickness,
            origin + half_x - half_y - thickness,
            origin - half_x + half_y + thickness,
            origin + half_x + half_y + thickness,
        ]);

        Self {
            origin,
            vx,
            vy,
            vz,
            sx,
            sy,
            material,
            bbox,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.vz
    }

    pub fn size(&self) -> (f32, f32) {
        (self.sx, self.sy)
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Local `(x, y)` coordinates of a point projected onto the patch.
    pub fn local_coords(&self, p: Vec3) -> (f32, f32) {
        let local = p - self.origin;
        (local.dot(self.vx), local.dot(self.vy))
    }

    /// Half-open containment test on local coordinates.
    pub fn contains_local(&self, x: f32, y: f32) -> bool {
        x >= -0.5 * self.sx && x < 0.5 * self.sx && y >= -0.5 * self.sy && y < 0.5 * self.sy
    }
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let dot_nl = ray.direction().dot(self.vz);
        if dot_nl == 0.0 {
            return None;
        }

        let t = (self.origin - ray.origin()).dot(self.vz) / dot_nl;
        // The epsilon floor avoids self-shadowing acne
        if !ray_t.contains(t) || t <= EPSILON {
            return None;
        }

        let (x, y) = self.local_coords(ray.at(t));
        if !self.contains_local(x, y) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.vz, self.material))
    }

    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        if let Some(rec) = self.hit(ray, ray_t) {
            hits.push(rec);
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
