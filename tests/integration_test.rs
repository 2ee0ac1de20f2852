use image::{Rgba, RgbaImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs `sparkle-gen` with the given working directory
fn run_sparkle_gen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sparkle-gen"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run sparkle-gen command")
}

/// Runs `verify_sparkle` against the given icon
fn run_verify_sparkle(path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_verify_sparkle"))
        .arg(path)
        .output()
        .expect("Failed to run verify_sparkle command")
}

fn assert_success(output: &Output, what: &str) {
    if !output.status.success() {
        eprintln!("Command failed with status: {}", output.status);
        eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        panic!("{} failed", what);
    }
}

/// Test that running `sparkle-gen` with no arguments writes a valid
/// 32x32 RGBA sparkle.png into the working directory.
#[test]
fn test_sparkle_generation_in_working_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let output = run_sparkle_gen(temp_dir.path(), &[]);
    assert_success(&output, "sparkle-gen");

    let icon_path = temp_dir.path().join("sparkle.png");
    assert!(
        icon_path.exists(),
        "sparkle.png should exist at: {}",
        icon_path.display()
    );

    let generated = image::open(&icon_path).expect("Failed to load generated icon");
    assert_eq!(generated.width(), 32, "Generated icon width should be 32");
    assert_eq!(generated.height(), 32, "Generated icon height should be 32");
    assert!(generated.color().has_alpha(), "Generated icon should keep alpha");

    let rgba_img = generated.to_rgba8();
    assert!(rgba_img.get_pixel(0, 0)[3] < 50);
    assert_eq!(*rgba_img.get_pixel(16, 16), Rgba([255, 215, 0, 255]));
    assert_eq!(*rgba_img.get_pixel(16, 6), Rgba([255, 215, 0, 255]));

    let diagonal = rgba_img.get_pixel(26, 26);
    assert!(diagonal[3] > 0 && diagonal[3] < 255);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated sparkle.png"), "stdout: {}", stdout);
}

/// Test that two runs produce byte-identical files
#[test]
fn test_sparkle_generation_is_deterministic() {
    let first_dir = TempDir::new().expect("Failed to create temp directory");
    let second_dir = TempDir::new().expect("Failed to create temp directory");

    assert_success(&run_sparkle_gen(first_dir.path(), &[]), "first sparkle-gen run");
    assert_success(&run_sparkle_gen(second_dir.path(), &[]), "second sparkle-gen run");

    let first = std::fs::read(first_dir.path().join("sparkle.png")).unwrap();
    let second = std::fs::read(second_dir.path().join("sparkle.png")).unwrap();
    assert_eq!(first, second, "sparkle.png should be byte-identical across runs");
}

/// Test that a failed write exits non-zero with an error message
#[test]
fn test_sparkle_generation_reports_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::create_dir(temp_dir.path().join("sparkle.png")).unwrap();

    let output = run_sparkle_gen(temp_dir.path(), &[]);

    assert!(!output.status.success(), "sparkle-gen should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sparkle.png"), "stderr: {}", stderr);
}

#[test]
fn test_unexpected_argument_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let output = run_sparkle_gen(temp_dir.path(), &["extra"]);

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("sparkle.png").exists());
}

#[test]
fn test_verify_sparkle_accepts_generated_icon() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    assert_success(&run_sparkle_gen(temp_dir.path(), &[]), "sparkle-gen");

    let output = run_verify_sparkle(&temp_dir.path().join("sparkle.png"));
    assert_success(&output, "verify_sparkle");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sparkle looks right"), "stdout: {}", stdout);
}

#[test]
fn test_verify_sparkle_rejects_blank_icon() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blank_path = temp_dir.path().join("blank.png");
    RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 0]))
        .save(&blank_path)
        .expect("Failed to save blank image");

    let output = run_verify_sparkle(&blank_path);

    assert!(!output.status.success(), "blank icon should fail verification");
}

#[test]
fn test_verify_sparkle_defaults_to_output_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    assert_success(&run_sparkle_gen(temp_dir.path(), &[]), "sparkle-gen");

    let output = Command::new(env!("CARGO_BIN_EXE_verify_sparkle"))
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to run verify_sparkle command");
    assert_success(&output, "verify_sparkle without a path");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Checking sparkle in: sparkle.png"), "stdout: {}", stdout);
    assert!(stdout.contains("center (16,16) is opaque gold"), "stdout: {}", stdout);
    assert!(stdout.contains("top of cross (16,6) is opaque gold"), "stdout: {}", stdout);
}

#[test]
fn test_verify_sparkle_rejects_wrong_size() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let large_path = temp_dir.path().join("large.png");
    RgbaImage::from_pixel(64, 64, Rgba([255, 215, 0, 255]))
        .save(&large_path)
        .expect("Failed to save large image");

    let output = run_verify_sparkle(&large_path);

    assert!(!output.status.success(), "64x64 icon should fail verification");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("32x32"), "stderr: {}", stderr);
}
