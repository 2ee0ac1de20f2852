//! Renders a small glowing sparkle icon.
//!
//! [`sparkle_gen::render_sparkle`] draws the icon in memory and
//! [`sparkle_gen::generate_sparkle`] writes it to disk as a PNG.

pub mod recipe;
pub mod sparkle_gen;
