use crate::recipe::{Recipe, Stroke};
use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    imageops, ColorType, ImageEncoder, Rgba, RgbaImage,
};
use std::{
    io::{BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;

/// Width and height of the generated icon
pub const ICON_SIZE: u32 = 32;

/// Gaussian sigma used for the glow halo
pub const GLOW_SIGMA: f32 = 2.0;

/// File name written to the current working directory
pub const OUTPUT_FILE: &str = "sparkle.png";

/// Render the sparkle and write it to `output` as an RGBA PNG
pub fn generate_sparkle(output: &Path) -> Result<()> {
    println!("Generating {}...", output.display());

    let icon = render_sparkle()?;
    save_png(&icon, output)?;

    println!("✓ Generated {}", output.display());
    Ok(())
}

/// Render the sparkle in memory
///
/// Draws the recipe strokes onto a transparent canvas, blurs a copy of it
/// and lays the sharp drawing back on top so the strokes keep their edges
/// while the blur shows through as a glow.
pub fn render_sparkle() -> Result<RgbaImage> {
    let recipe = Recipe::sparkle()?;

    let mut canvas = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 0, 0]));
    let center = canvas_center(&canvas);

    for stroke in &recipe.strokes {
        draw_stroke(&mut canvas, stroke, center)?;
    }

    let glow = imageops::blur(&canvas, GLOW_SIGMA);

    Ok(composite_over(&canvas, &glow))
}

/// Center of the canvas, rounded down
pub fn canvas_center(canvas: &RgbaImage) -> (i32, i32) {
    ((canvas.width() / 2) as i32, (canvas.height() / 2) as i32)
}

/// Blend a single stroke onto the canvas
pub fn draw_stroke(canvas: &mut RgbaImage, stroke: &Stroke, center: (i32, i32)) -> Result<()> {
    let color = stroke.rgba()?;
    let (start, end) = stroke.endpoints(center)?;
    let width = canvas.width();
    let mask = stroke_mask(width, canvas.height(), start, end, stroke.width);

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if mask[(y * width + x) as usize] {
            *pixel = alpha_blend(color, *pixel);
        }
    }

    Ok(())
}

/// Pixels touched by a stroke, row-major
///
/// The centerline is walked with Bresenham's algorithm, both endpoints
/// included. Each centerline pixel is widened across the minor axis by
/// offsets `-(w / 2)..=(w - 1) / 2`. Pixels outside the canvas are dropped.
///
/// Coordinates are walked as `i64`, so any `i32` endpoints and `u32` width
/// are in range.
pub fn stroke_mask(
    width: u32,
    height: u32,
    start: (i32, i32),
    end: (i32, i32),
    stroke_width: u32,
) -> Vec<bool> {
    let mut mask = vec![false; width as usize * height as usize];

    let (x0, y0) = (i64::from(start.0), i64::from(start.1));
    let (x1, y1) = (i64::from(end.0), i64::from(end.1));

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let x_major = dx >= -dy;

    // Offsets past the canvas never land, so cap the span
    let reach = i64::from(width.max(height));
    let w = i64::from(stroke_width);
    let (lo, hi) = ((-(w / 2)).max(-reach), ((w - 1) / 2).min(reach));

    let (w_px, h_px) = (i64::from(width), i64::from(height));
    let mut mark = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && x < w_px && y < h_px {
            mask[y as usize * width as usize + x as usize] = true;
        }
    };

    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;

    loop {
        for offset in lo..=hi {
            if x_major {
                mark(x, y + offset);
            } else {
                mark(x + offset, y);
            }
        }

        if (x, y) == (x1, y1) {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    mask
}

/// Lay `top` over `bottom` pixel by pixel
pub fn composite_over(top: &RgbaImage, bottom: &RgbaImage) -> RgbaImage {
    let mut result = bottom.clone();

    for (dst, src) in result.pixels_mut().zip(top.pixels()) {
        *dst = alpha_blend(*src, *dst);
    }

    result
}

/// Alpha blends two RGBA pixels (source over destination)
pub fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Encode the image as PNG and move it into place at `path`
///
/// On unix the file gets mode 0644 regardless of the process umask.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    write_atomic(path, |writer| {
        write_png(image.as_raw(), writer, image.width(), image.height())
    })
}

/// Write a file next to `path` first, then rename it over `path`
///
/// If `write` fails, the temporary file is removed and whatever was at
/// `path` before is left untouched.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush().context("Failed to write file")?;
    }

    // Temp files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .context("Failed to set file permissions")?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

// Encode RGBA8 data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, width: u32, height: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder
        .write_image(image_data, width, height, ColorType::Rgba8)
        .context("Failed to encode PNG")?;
    Ok(())
}
