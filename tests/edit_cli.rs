//! End-to-end tests: public library API and the `image-editor` binary.
//!
//! Inputs are synthetic images written to a temp directory, so the tests
//! need no fixtures.

use image::{Rgba, RgbaImage};
use image_editor::config::EditorConfig;
use image_editor::edit::edit_image;
use image_editor::imaging::{
    Alignment, Dispatch, GaussianBlur, ImageEditor, MimeType, Raster, Rect, Size, codec,
};
use image_editor::request::RawEditParams;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn checkerboard(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([250, 10, 10, 255])
        } else {
            Rgba([10, 10, 250, 128])
        }
    })
}

fn write_png(path: &Path, img: RgbaImage) {
    let bytes = codec::encode(&Raster::from_rgba(img), MimeType::Png, 75).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_image-editor"))
}

#[test]
fn library_crop_blur_roundtrip() {
    let input = codec::encode(&Raster::from_rgba(checkerboard(20, 12)), MimeType::Png, 75)
        .unwrap();
    let raw = RawEditParams {
        width: Some("8".into()),
        height: Some("6".into()),
        vertical: Some("left".into()),
        horizontal: Some("bottom".into()),
        filter: Some("blure".into()),
        blur_sigma: Some("not-a-number".into()),
    };
    let config = EditorConfig::default();
    let params = raw.resolve(config.filters.default_blur_sigma).unwrap();
    let out = edit_image(&input, &params, None, &config).unwrap();

    assert_eq!(out.report.edited_size, (8, 6));
    assert_eq!(out.report.filter.as_deref(), Some("blur(sigma=2)"));

    // The same edit done by hand with the sequential reference dispatch.
    let mut editor =
        ImageEditor::new(Raster::from_rgba(checkerboard(20, 12))).with_dispatch(Dispatch::Sequential);
    editor.crop_by_size_and_alignment(Size::new(8, 6), Alignment::new("left", "bottom"));
    assert_eq!(editor.bounds(), Rect::new(0, 6, 8, 12));
    editor.modify_pixels(Some(&GaussianBlur::new(2.0)));
    let expected = editor.into_edited_image();

    let decoded = codec::decode(&out.bytes).unwrap().raster;
    assert_eq!(decoded.as_raw(), expected.as_raw());
}

#[test]
fn cli_edit_writes_cropped_negative() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out.png");
    write_png(&input, checkerboard(10, 10));

    let status = bin()
        .args(["--config"])
        .arg(tmp.path().join("missing.toml"))
        .arg("edit")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--width", "4", "--height", "3", "--filter", "negative"])
        .status()
        .unwrap();
    assert!(status.success());

    let decoded = codec::decode(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(decoded.mime, MimeType::Png);
    assert_eq!((decoded.raster.width(), decoded.raster.height()), (4, 3));
    // Center crop of 10x10 to 4x3 starts at (3, 4): (3 + 4) is odd → blue cell.
    assert_eq!(decoded.raster.pixel(0, 0), Rgba([245, 245, 5, 128]));
}

#[test]
fn cli_edit_json_report_and_jpeg_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out.jpg");
    write_png(&input, checkerboard(6, 6));

    let out = bin()
        .args(["--config"])
        .arg(tmp.path().join("missing.toml"))
        .arg("edit")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--filter", "grayscale", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["output_mime"], "image/jpeg");
    assert_eq!(report["filter"], "grayscale");
    assert_eq!(report["cropped"], false);

    let decoded = codec::decode(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(decoded.mime, MimeType::Jpeg);
}

#[test]
fn cli_rejects_bad_parameters() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    write_png(&input, checkerboard(4, 4));

    for args in [
        vec!["--width", "-3", "--height", "2"],
        vec!["--width", "abc"],
        vec!["--filter", "sepia"],
        vec!["--filter", "blure", "--blur-sigma", "1e300"],
        vec!["--mime", "image/gif"],
    ] {
        let status = bin()
            .args(["--config"])
            .arg(tmp.path().join("missing.toml"))
            .arg("edit")
            .arg(&input)
            .arg("-o")
            .arg(tmp.path().join("out.png"))
            .args(&args)
            .status()
            .unwrap();
        assert!(!status.success(), "{args:?} should fail");
    }
}

#[test]
fn cli_rejects_unsupported_input() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.gif");
    std::fs::write(&input, b"GIF89a\x01\x00\x01\x00\x00\x00\x00;").unwrap();

    let status = bin().arg("check").arg(&input).status().unwrap();
    assert!(!status.success());
}

#[test]
fn cli_check_prints_size() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    write_png(&input, checkerboard(7, 3));

    let out = bin().arg("check").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Format: image/png"));
    assert!(stdout.contains("Size: 7x3"));
}

#[test]
fn cli_gen_config_is_loadable() {
    let tmp = TempDir::new().unwrap();
    let out = bin().arg("gen-config").output().unwrap();
    assert!(out.status.success());

    let path = tmp.path().join("image-editor.toml");
    std::fs::write(&path, &out.stdout).unwrap();
    let config = image_editor::config::load_config(&path).unwrap();
    assert_eq!(config, EditorConfig::default());
}

#[test]
fn cli_uses_sequential_dispatch_from_config() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out.png");
    let config = tmp.path().join("cfg.toml");
    write_png(&input, checkerboard(9, 9));
    std::fs::write(
        &config,
        "[processing]\ndispatch = \"sequential\"\n[filters]\ndefault_blur_sigma = 1.0\n",
    )
    .unwrap();

    let status = bin()
        .arg("--config")
        .arg(&config)
        .arg("edit")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--filter", "blure", "--blur-sigma", "0"])
        .status()
        .unwrap();
    assert!(status.success());

    let mut editor = ImageEditor::new(Raster::from_rgba(checkerboard(9, 9)));
    editor.modify_pixels(Some(&GaussianBlur::new(1.0)));
    let decoded = codec::decode(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(&decoded.raster, editor.edited_image());
}
