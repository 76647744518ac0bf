use crate::Vec3;

/// A ray in 3D space: `P(t) = origin + t * direction`.
///
/// The direction is not required to be normalized; camera rays in particular
/// are not.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray from `origin` aimed at `target`, with a unit direction.
    ///
    /// Falls back to `+Y` when the two points coincide.
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        let direction = (target - origin).try_normalize().unwrap_or(Vec3::Y);
        Self { origin, direction }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_towards_is_normalized() {
        let ray = Ray::towards(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 4.0, 1.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.direction, Vec3::Y);
    }

    #[test]
    fn test_ray_towards_degenerate() {
        let p = Vec3::new(2.0, 0.0, 0.0);
        let ray = Ray::towards(p, p);
        assert_eq!(ray.direction, Vec3::Y);
    }
}
