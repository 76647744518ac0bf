use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes built from points always satisfy `min() <= max()` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two arbitrary corner points.
    ///
    /// The corners are sorted component-wise, so argument order does not matter.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Smallest box containing every point in `points`.
    ///
    /// Returns [`Aabb::EMPTY`] for an empty slice.
    pub fn from_point_cloud(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Aabb::EMPTY;
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Aabb::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Widen the box in place so that it contains `p`.
    ///
    /// Unlike [`Aabb::from_points`] this never pads, which keeps centroid
    /// bounds exact during BVH construction.
    pub fn grow(&mut self, p: Vec3) {
        self.x = self.x.include(p.x);
        self.y = self.y.include(p.y);
        self.z = self.z.include(p.z);
    }

    /// Widen the box in place so that it contains `other`.
    pub fn merge(&mut self, other: &Aabb) {
        *self = Aabb::surrounding(self, other);
    }

    /// Lower corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Upper corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True if the box contains no point at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Surface area of the box, zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let e = self.max() - self.min();
        2.0 * (e.x * e.y + e.x * e.z + e.y * e.z)
    }

    /// Clip `ray_t` against the three slabs of the box.
    ///
    /// Returns the overlapping parameter range, or `None` when the ray misses
    /// the box inside `ray_t`.
    pub fn hit_interval(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (slab.min - r.origin[axis]) * adinv;
            let mut t1 = (slab.max - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return None;
            }
        }
        Some(ray_t)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method.
    #[inline]
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.hit_interval(r, ray_t).is_some()
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
