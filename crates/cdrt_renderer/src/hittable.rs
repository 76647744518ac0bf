//! Hittable trait, HitRecord, and the two-stage hittable collection.
//!
//! A [`HittableList`] only accepts new objects. Consuming it with
//! [`HittableList::build_bvh`] yields an [`AcceleratedList`], the only type
//! that answers ray queries.

use crate::bvh::{Bvh, BvhConfig};
use crate::{Primitive, Ray};
use cdrt_math::{Aabb, Interval, Vec3};

/// Index of a primitive inside the collection that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub usize);

/// Index of a material inside the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub usize);

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: MaterialId,
    /// Primitive that was hit, filled in by the owning collection
    pub object: Option<PrimitiveId>,
}

impl HitRecord {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: MaterialId) -> Self {
        let mut rec = Self {
            t,
            p: ray.at(t),
            normal: outward_normal,
            front_face: true,
            material,
            object: None,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Tag the record with the primitive that produced it.
    #[inline]
    pub fn with_object(mut self, id: PrimitiveId) -> Self {
        self.object = Some(id);
        self
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Append every intersection with `t` inside `ray_t` to `hits`.
    ///
    /// Primitives append in increasing `t`; accelerated collections make no
    /// ordering promise.
    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>);

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// An unordered bag of hittable objects that is still being filled.
pub struct HittableList<T: Hittable = Primitive> {
    objects: Vec<T>,
    bbox: Aabb,
}

impl<T: Hittable> HittableList<T> {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list and return its id.
    pub fn add(&mut self, object: T) -> PrimitiveId {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
        PrimitiveId(self.objects.len() - 1)
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects added so far.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.objects.iter()
    }

    /// Freeze the list and build its BVH.
    pub fn build_bvh(self, config: &BvhConfig) -> AcceleratedList<T> {
        let bvh = Bvh::build(&self.objects, config);
        AcceleratedList {
            objects: self.objects,
            bvh,
            bbox: self.bbox,
        }
    }
}

impl<T: Hittable> Default for HittableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hittable> FromIterator<T> for HittableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

/// A frozen hittable list together with its BVH.
pub struct AcceleratedList<T: Hittable = Primitive> {
    objects: Vec<T>,
    bvh: Bvh,
    bbox: Aabb,
}

impl<T: Hittable> AcceleratedList<T> {
    /// Nearest hit by scanning every object, ignoring the BVH.
    ///
    /// The search interval shrinks to the closest hit found so far.
    pub fn hit_brute_force(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for (i, object) in self.objects.iter().enumerate() {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec.with_object(PrimitiveId(i)));
            }
        }

        closest
    }

    /// Get an object by id.
    pub fn get(&self, id: PrimitiveId) -> Option<&T> {
        self.objects.get(id.0)
    }

    /// Iterate over `(id, object)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &T)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (PrimitiveId(i), object))
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<T: Hittable> Hittable for AcceleratedList<T> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        if !self.bvh.is_empty() {
            return self.bvh.hit(&self.objects, ray, ray_t);
        }
        self.hit_brute_force(ray, ray_t)
    }

    /// Accelerator only: a BVH built over nothing reports no hits.
    fn hit_all(&self, ray: &Ray, ray_t: Interval, hits: &mut Vec<HitRecord>) {
        if !self.bvh.is_empty() {
            self.bvh.hit_all(&self.objects, ray, ray_t, hits);
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
