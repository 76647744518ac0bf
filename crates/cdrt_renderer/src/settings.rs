//! Immutable render configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bvh::BvhConfig;
use crate::IntegratorKind;

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Errors for settings that cannot drive a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Image size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("Sample count must be at least 1")]
    ZeroSamples,

    #[error("Bucket size must be at least 1")]
    ZeroBucketSize,

    #[error("BVH leaf capacity must be at least 1")]
    ZeroLeafCapacity,

    #[error("Convolution coefficient {name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
}

/// Tunable constants of the convolution-domain shading model.
///
/// These are heuristic knobs, not physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvolutionParams {
    /// Dig depth for secondary ray origins, also the numerator of `cosDR`.
    pub k_dig: f32,
    /// Weight of the self-occlusion term.
    pub k_r0: f32,
    /// Weight of the occlusion-by-others term.
    pub k_rn: f32,
    /// Scale applied before the power curve.
    pub k_total_dr_s: f32,
    /// Exponent of the power curve.
    pub exp_total_dr_s: f32,
}

impl Default for ConvolutionParams {
    fn default() -> Self {
        Self {
            k_dig: 0.001,
            k_r0: 1.0,
            k_rn: 0.05,
            k_total_dr_s: 1.0,
            exp_total_dr_s: 1.0,
        }
    }
}

impl ConvolutionParams {
    fn validate(&self) -> Result<(), SettingsError> {
        let fields = [
            ("k_dig", self.k_dig),
            ("k_r0", self.k_r0),
            ("k_rn", self.k_rn),
            ("k_total_dr_s", self.k_total_dr_s),
            ("exp_total_dr_s", self.exp_total_dr_s),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SettingsError::NonFinite { name, value });
            }
        }
        Ok(())
    }
}

/// Render settings passed to [`crate::Renderer::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel, laid out on a square stratified grid
    pub samples: u32,
    /// Recursion limit for the path tracer
    pub max_depth: u32,
    pub integrator: IntegratorKind,
    pub convolution: ConvolutionParams,
    pub bvh: BvhConfig,
    pub bucket_size: u32,
    /// Base seed for per-bucket random streams
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples: 1,
            max_depth: 10,
            integrator: IntegratorKind::Convolution,
            convolution: ConvolutionParams::default(),
            bvh: BvhConfig::default(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Check every field that would otherwise break a render.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::ZeroSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples == 0 {
            return Err(SettingsError::ZeroSamples);
        }
        if self.bucket_size == 0 {
            return Err(SettingsError::ZeroBucketSize);
        }
        if self.bvh.leaf_capacity == 0 {
            return Err(SettingsError::ZeroLeafCapacity);
        }
        self.convolution.validate()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Strata per row of the sample grid.
    pub fn samples_w(&self) -> u32 {
        ((self.samples as f32).sqrt() as u32).max(1)
    }

    /// Strata per column of the sample grid.
    pub fn samples_h(&self) -> u32 {
        self.samples_w()
    }

    /// Offset that centres a sample inside its stratum.
    pub fn sample_offset(&self) -> f32 {
        0.5 / self.samples_w() as f32
    }

    /// Sub-pixel position of sample `s`, in `[0, 1)` on both axes.
    ///
    /// Samples beyond `samples_w * samples_h` wrap back onto the grid.
    pub fn sample_position(&self, s: u32) -> (f32, f32) {
        let w = self.samples_w();
        let h = self.samples_h();
        let si = s % w;
        let sj = (s / w) % h;
        let offset = self.sample_offset();
        (
            si as f32 / w as f32 + offset,
            sj as f32 / h as f32 + offset,
        )
    }
}
