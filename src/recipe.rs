//! Stroke recipe for the sparkle icon
//!
//! The sparkle is described as a short list of strokes radiating from the
//! canvas center. The list is embedded as JSON and drawn in order, so later
//! strokes land on top of earlier ones where they cross.

use anyhow::{anyhow, bail, Context, Result};
use image::Rgba;
use serde::Deserialize;
use std::str::FromStr;

/// The four strokes of the sparkle: a bright "+" and a softer "x".
pub const SPARKLE_RECIPE: &str = r##"
{
  "strokes": [
    { "name": "horizontal", "dx": 1, "dy": 0,  "half_length": 10, "width": 2, "color": "#ffd700", "alpha": 255 },
    { "name": "vertical",   "dx": 0, "dy": 1,  "half_length": 10, "width": 2, "color": "#ffd700", "alpha": 255 },
    { "name": "diagonal",   "dx": 1, "dy": 1,  "half_length": 10, "width": 1, "color": "#ffd700", "alpha": 180 },
    { "name": "antidiagonal", "dx": 1, "dy": -1, "half_length": 10, "width": 1, "color": "#ffd700", "alpha": 180 }
  ]
}
"##;

/// Ordered list of strokes making up an icon.
#[derive(Deserialize, Debug, Clone)]
pub struct Recipe {
    pub strokes: Vec<Stroke>,
}

/// A straight line segment centered on the canvas center
///
/// The segment runs from `center - (dx, dy) * half_length` to
/// `center + (dx, dy) * half_length`.
#[derive(Deserialize, Debug, Clone)]
pub struct Stroke {
    /// Human readable label used in error messages
    pub name: String,

    /// Horizontal step of the direction, one of -1, 0, 1
    pub dx: i32,

    /// Vertical step of the direction, one of -1, 0, 1
    pub dy: i32,

    /// Distance in steps from the center to either endpoint
    pub half_length: u32,

    /// Stroke width in pixels
    pub width: u32,

    /// CSS color for the RGB channels (e.g. "#ffd700")
    pub color: String,

    /// 8-bit alpha applied on top of the CSS color
    #[serde(default = "opaque")]
    pub alpha: u8,
}

/// Upper bound for `width` and `half_length`
pub const MAX_EXTENT: u32 = i16::MAX as u32;

fn opaque() -> u8 {
    255
}

impl Recipe {
    /// Parse and validate a recipe from JSON
    pub fn parse(json: &str) -> Result<Self> {
        let recipe: Recipe = serde_json::from_str(json).context("Failed to parse stroke recipe")?;

        if recipe.strokes.is_empty() {
            bail!("Stroke recipe must contain at least one stroke");
        }

        for stroke in &recipe.strokes {
            stroke.validate()?;
        }

        Ok(recipe)
    }

    /// The built-in sparkle recipe
    pub fn sparkle() -> Result<Self> {
        Self::parse(SPARKLE_RECIPE)
    }
}

impl Stroke {
    fn validate(&self) -> Result<()> {
        if !(-1..=1).contains(&self.dx) || !(-1..=1).contains(&self.dy) {
            bail!(
                "Stroke '{}' has an invalid direction ({}, {}); steps must be -1, 0 or 1",
                self.name,
                self.dx,
                self.dy
            );
        }
        if self.dx == 0 && self.dy == 0 {
            bail!("Stroke '{}' has no direction", self.name);
        }
        if self.width == 0 {
            bail!("Stroke '{}' must be at least 1 pixel wide", self.name);
        }
        if self.half_length == 0 {
            bail!("Stroke '{}' must have a half length of at least 1", self.name);
        }
        if self.width > MAX_EXTENT || self.half_length > MAX_EXTENT {
            bail!(
                "Stroke '{}' is too large (width {}, half length {}); both must be at most {}",
                self.name,
                self.width,
                self.half_length,
                MAX_EXTENT
            );
        }

        self.rgba().map(|_| ())
    }

    /// Resolve the stroke color to an RGBA pixel
    pub fn rgba(&self) -> Result<Rgba<u8>> {
        let color = css_color::Srgb::from_str(&self.color)
            .map_err(|_| anyhow!("Stroke '{}' has an invalid color: {}", self.name, self.color))?;

        Ok(Rgba([
            (color.red * 255.).round() as u8,
            (color.green * 255.).round() as u8,
            (color.blue * 255.).round() as u8,
            self.alpha,
        ]))
    }

    /// Both endpoints of the stroke around `center`, start first
    pub fn endpoints(&self, center: (i32, i32)) -> Result<((i32, i32), (i32, i32))> {
        let reach = i32::try_from(self.half_length)
            .with_context(|| format!("Stroke '{}' half length is out of range", self.name))?;
        let (cx, cy) = center;

        let step = |c: i32, d: i32, sign: i32| -> Result<i32> {
            d.checked_mul(reach)
                .and_then(|offset| offset.checked_mul(sign))
                .and_then(|offset| c.checked_add(offset))
                .ok_or_else(|| anyhow!("Stroke '{}' reaches outside the coordinate range", self.name))
        };

        Ok((
            (step(cx, self.dx, -1)?, step(cy, self.dy, -1)?),
            (step(cx, self.dx, 1)?, step(cy, self.dy, 1)?),
        ))
    }
}
