//! Scene light used as the target of convolution rays.

use cdrt_math::{Interval, Vec3, EPSILON};

use crate::{Color, Hittable, Plane, Ray};

/// A single scene light.
#[derive(Debug, Clone)]
pub enum Light {
    /// Infinitesimal emitter.
    Point { origin: Vec3, color: Color },
    /// Finite rectangular emitter.
    Area { plane: Plane, color: Color },
}

impl Light {
    pub fn point(origin: Vec3, color: Color) -> Self {
        Light::Point { origin, color }
    }

    pub fn area(plane: Plane, color: Color) -> Self {
        Light::Area { plane, color }
    }

    /// Reference point that secondary rays are aimed at.
    pub fn origin(&self) -> Vec3 {
        match self {
            Light::Point { origin, .. } => *origin,
            Light::Area { plane, .. } => plane.origin(),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Point { color, .. } | Light::Area { color, .. } => *color,
        }
    }

    /// Scalar energy carried along `ray` from this light.
    ///
    /// A point light is always reached because rays are aimed at it; an area
    /// light contributes only if the ray actually crosses the patch.
    pub fn intensity_from_ray(&self, ray: &Ray) -> f32 {
        let energy = self.color().element_sum() / 3.0;
        match self {
            Light::Point { .. } => energy,
            Light::Area { plane, .. } => {
                if plane.hit(ray, Interval::new(EPSILON, f32::INFINITY)).is_some() {
                    energy
                } else {
                    0.0
                }
            }
        }
    }
}
