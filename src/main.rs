use anyhow::Result;
use clap::Parser;
use sparkle_gen::sparkle_gen::{generate_sparkle, OUTPUT_FILE};
use std::path::Path;

#[derive(Debug, Parser)]
#[clap(
    name = "sparkle-gen",
    version,
    about = "Render a 32x32 glowing gold sparkle icon to ./sparkle.png"
)]
struct Args {}

fn main() -> Result<()> {
    let _args = Args::parse();

    generate_sparkle(Path::new(OUTPUT_FILE))
}
