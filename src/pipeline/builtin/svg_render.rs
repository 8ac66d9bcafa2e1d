// Builtin svg rasterizer, used as `cursor-forge rasterize` when no external
// converter is configured

use anyhow::{Context, Result, anyhow};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::Path;

/// The DPI at which one svg user unit is one pixel.
pub const BASE_DPI: f32 = 96.0;

pub fn render_svg(svg_path: &Path, dpi: u32) -> Result<RgbaImage> {
    let data = fs::read(svg_path).with_context(|| format!("Failed to read {}", svg_path.display()))?;

    let options = usvg::Options {
        resources_dir: svg_path.parent().map(Path::to_path_buf),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_data(&data, &options)
        .with_context(|| format!("Failed to parse {}", svg_path.display()))?;

    let scale = dpi as f32 / BASE_DPI;
    let size = tree.size();
    let width = (size.width() * scale).round().max(1.0) as u32;
    let height = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("Cannot allocate a {}x{} canvas", width, height))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    RgbaImage::from_raw(width, height, rgba).ok_or_else(|| anyhow!("Rendered buffer has the wrong size"))
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

pub fn rasterize_file(input: &Path, output: &Path, dpi: u32) -> Result<()> {
    let image = render_svg(input, dpi)?;
    write_png(&image, output).with_context(|| format!("Failed to write {}", output.display()))
}
