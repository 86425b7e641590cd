// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs the `blanker` binary against generated mask images.

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("blanker-cli-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_mask(path: &PathBuf) {
    let mask = RgbaImage::from_fn(20, 32, |x, y| {
        if (8..12).contains(&y) && x > 4 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    mask.save(path).unwrap();
}

fn blanker() -> Command {
    Command::new(env!("CARGO_BIN_EXE_blanker"))
}

fn facet_count(bytes: &[u8]) -> usize {
    u32::from_le_bytes(bytes[80..84].try_into().unwrap()) as usize
}

#[test]
fn test_writes_binary_stl() {
    let dir = work_dir("write");
    let image = dir.join("mask.png");
    let output = dir.join("pen.stl");
    write_mask(&image);

    let status = blanker()
        .arg("--image")
        .arg(&image)
        .arg("--output")
        .arg(&output)
        .args(["--units", "mm", "--length", "20", "--tube", "6", "--diameter", "12"])
        .args(["--image-zero", "4", "--step-size", "0.25"])
        .status()
        .unwrap();
    assert!(status.success());

    let bytes = fs::read(&output).unwrap();
    assert!(facet_count(&bytes) > 0);
    assert_eq!(bytes.len(), 84 + 50 * facet_count(&bytes));
    assert!(bytes.starts_with(b"blanker,name:pen.stl"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_configuration_file() {
    let dir = work_dir("config");
    let image = dir.join("mask.png");
    let config = dir.join("blank.json");
    let output = dir.join("mold.stl");
    write_mask(&image);
    fs::write(
        &config,
        format!(
            r#"{{
                "units": "mm",
                "length": 20,
                "tube": 6,
                "diameter": 12,
                "image_zero": 4,
                "round_mold": 30,
                "funnel": 10,
                "image": {:?},
                "tunables": {{ "step_size": 0.25 }}
            }}"#,
            image.to_string_lossy()
        ),
    )
    .unwrap();

    let status = blanker()
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(fs::metadata(&output).unwrap().len() > 84);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_bad_input_fails_without_output() {
    let dir = work_dir("fail");
    let output = dir.join("never.stl");

    let status = blanker()
        .arg("--image")
        .arg(dir.join("missing.png"))
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!output.exists());

    let image = dir.join("mask.png");
    write_mask(&image);
    let status = blanker()
        .arg("--image")
        .arg(&image)
        .arg("--output")
        .arg(&output)
        .args(["--units", "furlong"])
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!output.exists());
    fs::remove_dir_all(&dir).unwrap();
}
