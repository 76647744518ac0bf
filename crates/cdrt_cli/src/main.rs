//! Render the demo scene to an image file.
//!
//! Usage: `cdrt [--settings FILE.json] [--mesh FILE.obj] [--out FILE.png]`

mod demo;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cdrt_renderer::{CancelToken, RenderSettings, Renderer};
use image::{Rgb, RgbImage};

#[derive(Debug, Default)]
struct Args {
    settings: Option<PathBuf>,
    mesh: Option<PathBuf>,
    out: Option<PathBuf>,
}

const USAGE: &str = "Usage: cdrt [--settings FILE.json] [--mesh FILE.obj] [--out FILE.png]";

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Option<Args>> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--settings" => &mut parsed.settings,
            "--mesh" => &mut parsed.mesh,
            "--out" => &mut parsed.out,
            "-h" | "--help" => return Ok(None),
            other => bail!("Unknown argument '{}'\n{}", other, USAGE),
        };
        let value = args
            .next()
            .with_context(|| format!("Missing value for {}", arg))?;
        *slot = Some(PathBuf::from(value));
    }

    Ok(Some(parsed))
}

fn load_settings(path: Option<&PathBuf>) -> Result<RenderSettings> {
    let Some(path) = path else {
        return Ok(RenderSettings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    let settings: RenderSettings = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Convert the renderer's bottom-up float rows into a top-down 8-bit image.
fn to_image(rgb: &[f32], width: u32, height: u32) -> RgbImage {
    let to_u8 = |c: f32| (255.0 * c.clamp(0.0, 1.0)) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        let row = height - 1 - y;
        let i = ((row * width + x) * 3) as usize;
        Rgb([to_u8(rgb[i]), to_u8(rgb[i + 1]), to_u8(rgb[i + 2])])
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let settings = load_settings(args.settings.as_ref())?;
    settings.validate()?;

    let scene = demo::build_scene(&settings, args.mesh.as_deref())?;
    let camera = demo::camera(&settings);
    let (width, height) = (settings.width, settings.height);
    let renderer = Renderer::new(scene, camera, settings)?;

    let stats = renderer.render(&CancelToken::new())?;
    log::info!(
        "{} buckets, {} spp in {:.2?}",
        stats.buckets,
        stats.samples_per_pixel,
        stats.elapsed
    );

    let rgb = renderer
        .last_render()
        .context("Render finished without a frame")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from("render.png"));
    to_image(&rgb, width, height)
        .save(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    log::info!("Wrote {}", out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(args(&["--mesh", "a.obj", "--out", "b.png"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.mesh, Some(PathBuf::from("a.obj")));
        assert_eq!(parsed.out, Some(PathBuf::from("b.png")));
        assert_eq!(parsed.settings, None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--mesh"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_to_image_flips_rows() {
        // Bottom row red, top row blue
        let rgb = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let img = to_image(&rgb, 1, 2);
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 0, 0]));
    }
}
