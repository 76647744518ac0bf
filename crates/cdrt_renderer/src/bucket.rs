//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon. Frame rows are counted from
//! the bottom of the image, matching the camera's `v` axis.

use rand::RngCore;

use crate::renderer::{render_pixel, CancelToken, RenderContext};
use crate::Color;

/// A rectangular region of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Column of the bucket's first pixel
    pub x: u32,
    /// Row of the bucket's first pixel
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets closest to the image centre come first so the interesting
/// part of a frame finishes early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
///
/// The sort is stable, so equidistant buckets keep raster order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let dist = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
}

/// Render a single bucket to summed sample colors.
///
/// Returns pixels in row-major order within the bucket, or `None` if the
/// cancellation token fired before one of its scanlines.
pub fn render_bucket(
    bucket: &Bucket,
    ctx: &RenderContext<'_>,
    rng: &mut dyn RngCore,
    cancel: &CancelToken,
) -> Option<Vec<Color>> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        if cancel.is_cancelled() {
            return None;
        }
        for local_x in 0..bucket.width {
            let color = render_pixel(ctx, bucket.x + local_x, bucket.y + local_y, rng);
            pixels.push(color);
        }
    }

    Some(pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Summed pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket into a full-frame buffer of `frame_width` columns.
    pub fn write_into(&self, frame: &mut [[f32; 3]], frame_width: u32) {
        let b = &self.bucket;
        for (row, chunk) in self.pixels.chunks(b.width as usize).enumerate() {
            let start = ((b.y as usize + row) * frame_width as usize) + b.x as usize;
            for (dst, color) in frame[start..start + chunk.len()].iter_mut().zip(chunk) {
                *dst = color.to_array();
            }
        }
    }
}
