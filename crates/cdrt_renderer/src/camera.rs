//! Pinhole camera for ray generation.

use crate::Ray;
use cdrt_math::Vec3;

/// Pinhole camera with a focal distance of 1.
///
/// Rays are produced from normalized image-plane coordinates, `u` growing to
/// the right and `v` growing upward. Directions are not normalized.
#[derive(Debug, Clone)]
pub struct Camera {
    vfov: f32,
    aspect_ratio: f32,

    // Viewport size at focal distance 1
    viewport_width: f32,
    viewport_height: f32,

    // Cached basis, rebuilt by with_position
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lower_left_corner: Vec3,
}

impl Camera {
    /// Camera at the origin looking down `-Z`.
    ///
    /// - `vfov`: vertical field of view in degrees
    /// - `aspect_ratio`: width / height
    pub fn new(vfov: f32, aspect_ratio: f32) -> Self {
        let h = (vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        let mut camera = Self {
            vfov,
            aspect_ratio,
            viewport_width,
            viewport_height,
            origin: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lower_left_corner: Vec3::ZERO,
        };
        camera.update_corner();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.origin = look_from;
        self.w = (look_from - look_at).try_normalize().unwrap_or(Vec3::Z);
        self.u = vup
            .cross(self.w)
            .try_normalize()
            .unwrap_or_else(|| self.w.any_orthonormal_vector());
        self.v = self.w.cross(self.u);
        self.update_corner();
        self
    }

    fn update_corner(&mut self) {
        self.lower_left_corner = self.origin
            - self.u * self.viewport_width * 0.5
            - self.v * self.viewport_height * 0.5
            - self.w;
    }

    /// Ray through image-plane coordinates `(u, v)` in `[0, 1)`.
    pub fn get_ray(&self, u: f32, v: f32) -> Ray {
        let target = self.lower_left_corner
            + u * self.u * self.viewport_width
            + v * self.v * self.viewport_height;
        Ray::new(self.origin, target - self.origin)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(45.0, 4.0 / 3.0)
    }
}
