//! Math primitives shared by the convolution-domain ray tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Small floor used for ray parameters and normalisation guards.
pub const EPSILON: f32 = 1e-8;
