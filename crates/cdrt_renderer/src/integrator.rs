//! Light-transport integrators and the setting that selects one.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{Color, ConvolutionIntegrator, PathTracer, Ray, RenderSettings, Scene};

/// Estimates the radiance carried back along a camera ray.
pub trait Integrator: Send + Sync {
    fn radiance(&self, ray: &Ray, scene: &Scene, rng: &mut dyn RngCore) -> Color;

    fn name(&self) -> &'static str;
}

/// Which integrator a render uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// Occlusion-interval heuristic.
    #[default]
    Convolution,
    /// Depth-limited recursive path tracing.
    PathTrace,
}

impl IntegratorKind {
    /// Instantiate the selected integrator from the render settings.
    pub fn build(self, settings: &RenderSettings) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::Convolution => Box::new(ConvolutionIntegrator::new(settings.convolution)),
            IntegratorKind::PathTrace => Box::new(PathTracer::new(settings.max_depth)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dispatch() {
        let mut settings = RenderSettings::default();
        assert_eq!(IntegratorKind::Convolution.build(&settings).name(), "convolution");

        settings.integrator = IntegratorKind::PathTrace;
        assert_eq!(settings.integrator.build(&settings).name(), "path_trace");
    }
}
