//! Closed set of scene primitives.

use cdrt_math::{Aabb, Interval};

use crate::{HitRecord, Hittable, MaterialId, Mesh, Plane, Ray, Sphere, Triangle};

/// Any geometry a scene can hold.
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Plane(Plane),
    Mesh(Mesh),
}

impl Primitive {
    /// Material shared by every surface of this primitive.
    pub fn material(&self) -> MaterialId {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Triangle(t) => t.material(),
            Primitive::Plane(p) => p.material(),
            Primitive::Mesh(m) => m.material(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Triangle(_) => "triangle",
            Primitive::Plane(_) => "plane",
            Primitive::Mesh(_) => "mesh",
        }
    }
}

impl Hittable for Primitive {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Triangle(t) => t.hit(ray, ray_t),
            Primitive::Plane(p) => p.hit(ray, ray_t),
            Primitive::Mesh(m) => m.hit(ray, ray_t),
        }
    }

    #[inline]
    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        match self {
            Primitive::Sphere(s) => s.hit_all(ray, ray_t, hits),
            Primitive::Triangle(t) => t.hit_all(ray, ray_t, hits),
            Primitive::Plane(p) => p.hit_all(ray, ray_t, hits),
            Primitive::Mesh(m) => m.hit_all(ray, ray_t, hits),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
            Primitive::Plane(p) => p.bounding_box(),
            Primitive::Mesh(m) => m.bounding_box(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Plane> for Primitive {
    fn from(p: Plane) -> Self {
        Primitive::Plane(p)
    }
}

impl From<Mesh> for Primitive {
    fn from(m: Mesh) -> Self {
        Primitive::Mesh(m)
    }
}
