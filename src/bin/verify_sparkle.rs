use anyhow::{bail, Context, Result};
use image::io::Reader as ImageReader;
use image::Rgba;
use sparkle_gen::recipe::{Recipe, Stroke};
use sparkle_gen::sparkle_gen::{ICON_SIZE, OUTPUT_FILE};

const GOLD: Rgba<u8> = Rgba([255, 215, 0, 255]);

fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| OUTPUT_FILE.to_string());

    let img = ImageReader::open(&path)
        .with_context(|| format!("Failed to open {}", path))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path))?;

    let width = img.width();
    let height = img.height();

    println!("Checking sparkle in: {}", path);
    println!("Image dimensions: {}x{}", width, height);
    println!("Color type: {:?}", img.color());

    if width != ICON_SIZE || height != ICON_SIZE {
        bail!(
            "Expected a {size}x{size} icon, found {}x{}",
            width,
            height,
            size = ICON_SIZE
        );
    }
    if !img.color().has_alpha() {
        bail!("Icon has no alpha channel");
    }

    // Sample points follow the stroke recipe the renderer draws
    let recipe = Recipe::sparkle()?;
    let c = (ICON_SIZE / 2) as i32;
    let (top_xy, _) = stroke_named(&recipe, "vertical")?.endpoints((c, c))?;
    let (_, diagonal_xy) = stroke_named(&recipe, "diagonal")?.endpoints((c, c))?;

    let rgba_img = img.to_rgba8();
    let sample = |(x, y): (i32, i32)| -> Result<Rgba<u8>> {
        let px = u32::try_from(x).context("Sample point is off the canvas")?;
        let py = u32::try_from(y).context("Sample point is off the canvas")?;
        if px >= rgba_img.width() || py >= rgba_img.height() {
            bail!("Sample point ({}, {}) is off the canvas", x, y);
        }
        Ok(*rgba_img.get_pixel(px, py))
    };

    let corner = sample((0, 0))?;
    let center = sample((c, c))?;
    let top = sample(top_xy)?;
    let diagonal = sample(diagonal_xy)?;

    let checks = [
        ("corner (0,0) is near transparent".to_string(), corner, corner[3] < 50),
        (
            format!("center ({},{}) is opaque gold", c, c),
            center,
            is_near_gold(center),
        ),
        (
            format!("top of cross ({},{}) is opaque gold", top_xy.0, top_xy.1),
            top,
            top == GOLD,
        ),
        (
            format!("diagonal end ({},{}) is translucent", diagonal_xy.0, diagonal_xy.1),
            diagonal,
            diagonal[3] > 0 && diagonal[3] < 255,
        ),
    ];

    println!("\nPixel analysis:");
    let mut failed = 0;
    for (label, pixel, ok) in &checks {
        let mark = if *ok { "✓" } else { "✗" };
        println!(
            "  {} {}: RGBA [{}, {}, {}, {}]",
            mark, label, pixel[0], pixel[1], pixel[2], pixel[3]
        );
        if !ok {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} out of {} sparkle checks failed", failed, checks.len());
    }

    println!("\n✓ Sparkle looks right!");
    Ok(())
}

fn stroke_named<'a>(recipe: &'a Recipe, name: &str) -> Result<&'a Stroke> {
    recipe
        .strokes
        .iter()
        .find(|stroke| stroke.name == name)
        .with_context(|| format!("Sparkle recipe has no '{}' stroke", name))
}

fn is_near_gold(pixel: Rgba<u8>) -> bool {
    pixel[3] == 255
        && pixel
            .0
            .iter()
            .zip(GOLD.0.iter())
            .all(|(&a, &b)| a.abs_diff(b) <= 2)
}
