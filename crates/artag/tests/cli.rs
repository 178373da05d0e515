#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;

const CODES: [u64; 10] = [
    0x0a5_cd68, 0x1e5_4e9b, 0x04d_3c1a, 0x0ca_264e, 0x018_b8ff, 0x025_165e, 0x1a4_7e10, 0x112_5f20,
    0x030_31d0, 0x0bb_3b93,
];

fn draw_marker(img: &mut RgbImage, code: u64, center: (u32, u32), cell: u32) {
    let x0 = center.0 - 9 * cell / 2;
    let y0 = center.1 - 9 * cell / 2;
    for cy in 0..9u32 {
        for cx in 0..9u32 {
            let inner = (2..7).contains(&cx) && (2..7).contains(&cy);
            let black = !inner || (code >> ((cy - 2) * 5 + (cx - 2))) & 1 == 1;
            if !black {
                continue;
            }
            for y in 0..cell {
                for x in 0..cell {
                    img.put_pixel(x0 + cx * cell + x, y0 + cy * cell + y, Rgb([0, 0, 0]));
                }
            }
        }
    }
}

/// Writes dictionary, config, color and depth files for a two-marker scene.
fn write_scene(dir: &Path, depth_width: u32) {
    let dict = serde_json::json!({
        "name": "test10",
        "marker_size": 5,
        "max_correction_bits": 3,
        "codes": CODES,
    });
    std::fs::write(dir.join("dict.json"), dict.to_string()).expect("dict");
    let config = serde_json::json!({
        "dictionary_path": "dict.json",
        "horizontal_fov_deg": 78.0,
        "output_path": dir.join("default_report.json"),
    });
    std::fs::write(dir.join("config.json"), config.to_string()).expect("config");

    let mut color = RgbImage::from_pixel(480, 120, Rgb([220, 220, 220]));
    draw_marker(&mut color, CODES[3], (100, 50), 8);
    draw_marker(&mut color, CODES[7], (400, 50), 8);
    color.save(dir.join("color.png")).expect("color png");

    let depth: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_pixel(depth_width, 120, Luma([1500u16]));
    depth.save(dir.join("depth.png")).expect("depth png");
}

fn detect_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("artag").expect("binary");
    cmd.arg("detect")
        .arg("--config")
        .arg(dir.join("config.json"))
        .arg("--color")
        .arg(dir.join("color.png"))
        .arg("--depth")
        .arg(dir.join("depth.png"));
    cmd
}

#[test]
fn detect_prints_tags_left_to_right() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    let report = dir.path().join("report.json");
    let overlay = dir.path().join("overlay.png");

    detect_cmd(dir.path())
        .arg("--report")
        .arg(&report)
        .arg("--rejected-overlay")
        .arg(&overlay)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "first: id=3 x=100.0 y=50.0 bearing=-25.28",
        ))
        .stdout(predicate::str::contains(
            "second: id=7 x=400.0 y=50.0 bearing=28.36",
        ));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["markers"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["first"]["tag"]["id"], 3);
    assert!(json["error"].is_null());
    assert!(overlay.exists());
    assert!(!dir.path().join("default_report.json").exists());
}

#[test]
fn report_defaults_to_config_output_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    detect_cmd(dir.path()).assert().success();
    assert!(dir.path().join("default_report.json").exists());
}

#[test]
fn mismatched_depth_fails_and_records_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 240);

    detect_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("depth frame is 240x120"));

    let raw = std::fs::read_to_string(dir.path().join("default_report.json")).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(json["error"].is_string());
    assert!(json["first"].is_null());
}

#[test]
fn missing_dictionary_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    std::fs::remove_file(dir.path().join("dict.json")).expect("remove");

    detect_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dict.json"));
}

#[test]
fn dict_info_prints_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    Command::cargo_bin("artag")
        .expect("binary")
        .arg("dict-info")
        .arg("--dictionary")
        .arg(dir.path().join("dict.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("markers:             10"))
        .stdout(predicate::str::contains("5x5"));
}

#[test]
fn color_depth_image_fails_and_records_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    RgbImage::from_pixel(480, 120, Rgb([10, 10, 10]))
        .save(dir.path().join("depth.png"))
        .expect("rgb depth png");

    detect_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported depth image format"));

    let raw = std::fs::read_to_string(dir.path().join("default_report.json")).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("unsupported depth")));
    assert_eq!(json["width"], 480);
    assert!(json["first"].is_null());
}

#[test]
fn unreadable_color_image_still_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_scene(dir.path(), 480);
    std::fs::write(dir.path().join("color.png"), b"not a png").expect("garbage");

    detect_cmd(dir.path()).assert().failure();

    let raw = std::fs::read_to_string(dir.path().join("default_report.json")).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("failed to open image")));
}
