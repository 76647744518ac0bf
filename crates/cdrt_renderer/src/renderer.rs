//! Parallel bucket renderer with an accumulation snapshot.
//!
//! Each render samples every pixel on a stratified grid, sums the samples
//! per pixel and publishes the sums together with the sample count as one
//! snapshot. Readback applies `sqrt(sum / count)`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::{Camera, Color, Integrator, RenderSettings, Scene, SettingsError};

/// Errors returned by [`Renderer`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Render was cancelled")]
    Cancelled,

    #[error("Invalid render settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Shared flag for abandoning an in-flight render.
///
/// Checked before every scanline of every bucket.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub buckets: usize,
    pub samples_per_pixel: u32,
    pub elapsed: Duration,
}

/// Everything a worker needs to shade pixels.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub integrator: &'a dyn Integrator,
    pub settings: &'a RenderSettings,
}

/// Accumulated sums and the sample count they were built from.
#[derive(Default)]
struct Frame {
    pixels: Vec<[f32; 3]>,
    sample_count: u32,
    finished: bool,
}

pub struct Renderer {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    integrator: Box<dyn Integrator>,
    frame: Mutex<Frame>,
}

impl Renderer {
    pub fn new(scene: Scene, camera: Camera, settings: RenderSettings) -> Result<Self, RenderError> {
        settings.validate()?;
        let integrator = settings.integrator.build(&settings);

        Ok(Self {
            scene,
            camera,
            settings,
            integrator,
            frame: Mutex::new(Frame::default()),
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Render the whole frame.
    ///
    /// On success the new frame replaces the previous one. A cancelled
    /// render leaves the previous frame as it was.
    pub fn render(&self, cancel: &CancelToken) -> Result<RenderStats, RenderError> {
        let width = self.settings.width;
        let height = self.settings.height;
        let buckets = generate_buckets(width, height, self.settings.bucket_size);

        log::info!(
            "Rendering {}x{} with {} ({} spp, {} buckets)",
            width,
            height,
            self.integrator.name(),
            self.settings.samples,
            buckets.len()
        );
        let start = Instant::now();

        let ctx = RenderContext {
            scene: &self.scene,
            camera: &self.camera,
            integrator: self.integrator.as_ref(),
            settings: &self.settings,
        };

        let results: Option<Vec<BucketResult>> = buckets
            .par_iter()
            .map(|bucket| {
                let mut rng =
                    StdRng::seed_from_u64(self.settings.seed.wrapping_add(bucket.index as u64));
                render_bucket(bucket, &ctx, &mut rng, cancel)
                    .map(|pixels| BucketResult::new(*bucket, pixels))
            })
            .collect();

        let Some(results) = results else {
            log::warn!("Render cancelled after {:.2?}", start.elapsed());
            return Err(RenderError::Cancelled);
        };

        let mut pixels = vec![[0.0f32; 3]; width as usize * height as usize];
        for result in &results {
            result.write_into(&mut pixels, width);
        }

        {
            let mut frame = self.lock_frame();
            frame.pixels = pixels;
            frame.sample_count = self.settings.samples;
            frame.finished = true;
        }

        let elapsed = start.elapsed();
        log::info!("Render finished in {:.2?}", elapsed);

        Ok(RenderStats {
            buckets: results.len(),
            samples_per_pixel: self.settings.samples,
            elapsed,
        })
    }

    /// Gamma-corrected copy of the last finished frame.
    ///
    /// Row-major RGB triplets, row 0 at the bottom of the image. `None`
    /// until a render has completed.
    pub fn last_render(&self) -> Option<Vec<f32>> {
        let frame = self.lock_frame();
        if !frame.finished {
            return None;
        }

        let scale = 1.0 / frame.sample_count as f32;
        let flat: &[f32] = bytemuck::cast_slice(frame.pixels.as_slice());
        Some(flat.iter().map(|&sum| linear_to_gamma(sum * scale)).collect())
    }

    pub fn is_finished(&self) -> bool {
        self.lock_frame().finished
    }

    fn lock_frame(&self) -> MutexGuard<'_, Frame> {
        // Frame writes are plain assignments, so a poisoned lock still holds
        // a consistent snapshot
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sum of all stratified samples for pixel `(x, y)`.
///
/// Row `y` counts from the bottom of the image.
pub fn render_pixel(ctx: &RenderContext<'_>, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let settings = ctx.settings;
    let mut sum = Color::ZERO;

    for s in 0..settings.samples {
        let (dx, dy) = settings.sample_position(s);
        let u = (x as f32 + dx) / settings.width as f32;
        let v = (y as f32 + dy) / settings.height as f32;
        let ray = ctx.camera.get_ray(u, v);
        sum += ctx.integrator.radiance(&ray, ctx.scene, rng);
    }

    sum
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}
