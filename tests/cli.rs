// this_file: tests/cli.rs
//! CLI integration tests for the shuhua binary

use assert_cmd::prelude::*;
use assert_cmd::Command;
use image::{DynamicImage, Rgba, RgbaImage};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Helper to run the `shuhua` binary
fn bin() -> Command {
    Command::cargo_bin("shuhua").expect("binary exists")
}

fn fixture_font(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata/fonts")
        .join(name)
}

const VALID_CONFIG: &str = r#"{
    "version": "1.0",
    "template": {"path": "back.jpg"},
    "output": "dst.png",
    "fonts": {"kai": "kai.ttf", "song": "song.ttf"},
    "blocks": [
        {"text": "劝学", "left": 200, "top": 200, "line_height": 50, "font": "kai", "size": 120.0},
        {"text": "唐 颜真卿", "left": 350, "top": 520, "line_height": 30, "font": "kai", "size": 64.0}
    ]
}"#;

#[test]
fn test_cli_version_prints() {
    let mut cmd = bin();
    cmd.arg("version");
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("shuhua version"));
}

#[test]
fn test_cli_validate_accepts_valid_json() {
    let mut cmd = bin();
    cmd.arg("validate");
    cmd.write_stdin(VALID_CONFIG);
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Valid composition config"))
        .stdout(predicate::str::contains("Blocks: 2"));
}

#[test]
fn test_cli_validate_rejects_unknown_font() {
    let json = VALID_CONFIG.replace(r#""font": "kai", "size": 64.0"#, r#""font": "hei", "size": 64.0"#);

    let mut cmd = bin();
    cmd.arg("validate");
    cmd.write_stdin(json);
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Invalid composition config"))
        .stdout(predicate::str::contains("unknown font 'hei'"));
}

#[test]
fn test_cli_validate_reads_input_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poem.json");
    fs::write(&path, VALID_CONFIG).unwrap();

    let mut cmd = bin();
    cmd.arg("validate").arg("--input").arg(&path);
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Template: back.jpg"));
}

#[test]
fn test_cli_compose_writes_image_and_report() {
    let font = fixture_font("DejaVuSans.ttf");
    if !font.exists() {
        eprintln!("Skipping test: font file not found at {:?}", font);
        return;
    }

    let dir = tempdir().unwrap();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 300, Rgba([255, 255, 255, 255])))
        .save(dir.path().join("back.png"))
        .unwrap();

    let config = serde_json::json!({
        "version": "1.0",
        "template": { "path": "back.png" },
        "output": "dst.png",
        "fonts": { "sans": font },
        "blocks": [
            { "text": "ABC", "left": 40, "top": 60, "line_height": 50, "font": "sans", "size": 32.0 }
        ]
    });
    let config_path = dir.path().join("job.json");
    fs::write(&config_path, config.to_string()).unwrap();
    let override_path = dir.path().join("override.jpg");

    let mut cmd = bin();
    cmd.arg("--quiet")
        .arg("compose")
        .arg(&config_path)
        .arg("--output")
        .arg(&override_path);
    cmd.env_remove("RUST_LOG");

    let output = cmd.assert().success().get_output().stdout.clone();
    let out = String::from_utf8_lossy(&output);
    assert!(out.contains("\"glyphs\":3"), "glyph count missing: {}", out);
    assert!(out.contains("\"width\":200"), "width missing: {}", out);
    assert!(out.contains("\"elapsed_ms\":"), "elapsed_ms missing: {}", out);

    assert!(override_path.exists());
    assert!(!dir.path().join("dst.png").exists());
    let written = image::open(&override_path).unwrap();
    assert_eq!((written.width(), written.height()), (200, 300));
}

#[test]
fn test_cli_compose_missing_config_fails() {
    let mut cmd = bin();
    cmd.arg("compose").arg("/nonexistent/poem.json");
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
