//! Integration tests for directory batches
//!
//! Each test builds a small source directory in a temp dir, runs the batch
//! helpers end to end and inspects the written files and the report.

use image::{ImageFormat, Rgba, RgbaImage};
use logo_normalize::{
    plan_batch, run_sequential, BatchReport, FailureKind, FileOutcome, LogoProcessor, Manifest,
    PipelineConfig, WrittenOutputs,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10"/></svg>"#;

/// Dark blue bar on a white background
fn logo_image() -> RgbaImage {
    RgbaImage::from_fn(60, 20, |x, y| {
        if (10..50).contains(&x) && (5..15).contains(&y) {
            Rgba([20, 30, 140, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    logo_image().save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

fn write_jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let rgb = image::DynamicImage::ImageRgba8(logo_image()).to_rgb8();
    rgb.save_with_format(&path, ImageFormat::Jpeg).unwrap();
    path
}

fn run(files: Vec<PathBuf>, manifest: Option<&Manifest>, source: &Path, out: &Path) -> BatchReport {
    let _ = env_logger::builder().is_test(true).try_init();
    let processor = LogoProcessor::new(PipelineConfig::default()).unwrap();
    let items = plan_batch(files, manifest, source);
    let mut report = BatchReport::new(*processor.config(), None);
    run_sequential(&processor, &items, out, &mut report);
    report.finish();
    report
}

#[test]
fn test_batch_writes_light_and_dark_pairs() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![
        write_png(source.path(), "acme.png"),
        write_jpeg(source.path(), "globex.jpg"),
    ];

    let report = run(files, None, source.path(), out.path());

    assert_eq!(report.summary().processed, 2);
    assert_eq!(report.summary().failed, 0);
    for name in ["acme.png", "acme-dark.png", "globex.png", "globex-dark.png"] {
        let written = image::open(out.path().join(name)).unwrap();
        assert_eq!((written.width(), written.height()), (200, 80), "{}", name);
    }
}

#[test]
fn test_missing_input_does_not_stop_batch() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![
        source.path().join("absent.png"),
        write_png(source.path(), "zeta.png"),
    ];

    let report = run(files, None, source.path(), out.path());

    assert_eq!(report.summary().total, 2);
    assert_eq!(report.summary().processed, 1);
    assert_eq!(report.summary().failed, 1);

    let failure = report.failures()[0];
    assert!(matches!(
        failure.outcome,
        FileOutcome::Failed { kind: FailureKind::MissingInput, .. }
    ));
    assert!(out.path().join("zeta.png").is_file());
    assert!(!out.path().join("absent.png").exists());
}

#[test]
fn test_unwritable_output_fails_only_that_file() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // A directory squatting on the light output path makes the write fail
    std::fs::create_dir(out.path().join("acme.png")).unwrap();
    let files = vec![
        write_png(source.path(), "acme.png"),
        write_png(source.path(), "zeta.png"),
    ];

    let report = run(files, None, source.path(), out.path());

    assert_eq!(report.summary().failed, 1);
    assert_eq!(report.summary().processed, 1);
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::Failed { kind: FailureKind::Write, .. }
    ));
    assert!(report.files[1].is_success());
    assert!(out.path().join("zeta.png").is_file());
    assert!(out.path().join("zeta-dark.png").is_file());
}

#[test]
fn test_undecodable_input_is_reported() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let broken = source.path().join("broken.png");
    std::fs::write(&broken, b"definitely not a png").unwrap();

    let report = run(vec![broken], None, source.path(), out.path());

    assert_eq!(report.summary().failed, 1);
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::Failed { kind: FailureKind::Decode, .. }
    ));
    assert!(!out.path().join("broken-dark.png").exists());
}

#[test]
fn test_svg_is_copied_unchanged() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let svg = source.path().join("vector.svg");
    std::fs::write(&svg, SVG).unwrap();

    let report = run(vec![svg], None, source.path(), out.path());

    match &report.files[0].outcome {
        FileOutcome::Success {
            outputs: WrittenOutputs::Vector { copy },
        } => assert_eq!(copy, &out.path().join("vector.svg")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(std::fs::read_to_string(out.path().join("vector.svg")).unwrap(), SVG);
    assert!(!out.path().join("vector-dark.png").exists());
}

#[test]
fn test_manifest_targets_and_missing_sources() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![write_png(source.path(), "430px-Lisk-logo.png")];
    let manifest = Manifest::from_json(
        r#"{ "assets": {
            "430px-Lisk-logo.png": { "target": "lisk", "trim_to_content": true },
            "gone.png": { "target": "gone" }
        } }"#,
    )
    .unwrap();

    let report = run(files, Some(&manifest), source.path(), out.path());

    assert_eq!(report.summary().processed, 1);
    assert_eq!(report.summary().failed, 1);
    assert!(out.path().join("lisk.png").is_file());
    assert!(out.path().join("lisk-dark.png").is_file());
    assert!(!out.path().join("430px-Lisk-logo.png").exists());

    let gone = report.files.iter().find(|f| f.target == "gone").unwrap();
    assert!(gone.is_failure());
}

#[test]
fn test_manifest_skip_keying_keeps_background() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![write_png(source.path(), "opaque.png")];
    let manifest = Manifest::from_json(
        r#"{ "assets": { "opaque.png": { "keying": { "mode": "skip" }, "skip_normalize": true } } }"#,
    )
    .unwrap();

    run(files, Some(&manifest), source.path(), out.path());

    // 60x20 fits the strip as 194x64 at (3, 8); (5, 10) lies in the white margin of the source
    let light = image::open(out.path().join("opaque.png")).unwrap().to_rgba8();
    let pixel = light.get_pixel(5, 10);
    assert_eq!(pixel[3], 255);
    assert!(pixel[0] > 240, "got {:?}", pixel);

    let dark = image::open(out.path().join("opaque-dark.png")).unwrap().to_rgba8();
    assert_eq!(dark.get_pixel(5, 10)[3], 255);
}

#[test]
fn test_dark_named_input_writes_base_name() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![write_png(source.path(), "initech-dark.png")];

    let report = run(files, None, source.path(), out.path());

    assert_eq!(report.files[0].target, "initech");
    assert!(out.path().join("initech.png").is_file());
    assert!(out.path().join("initech-dark.png").is_file());
    assert!(!out.path().join("initech-dark-dark.png").exists());
}

#[test]
fn test_existing_outputs_are_overwritten() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("acme.png"), b"stale").unwrap();
    let files = vec![write_png(source.path(), "acme.png")];

    run(files, None, source.path(), out.path());

    assert!(image::open(out.path().join("acme.png")).is_ok());
}

#[test]
fn test_report_json_lists_every_file() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let files = vec![
        write_png(source.path(), "good.png"),
        source.path().join("missing.png"),
    ];
    let mut report = run(files, None, source.path(), out.path());
    report.record_skipped(source.path().join("old-dark.png"), "generated dark variant");

    let report_path = out.path().join("reports").join("batch.json");
    report.write_json(&report_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total"], 3);
    assert_eq!(json["summary"]["processed"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["summary"]["skipped"], 1);

    let statuses: Vec<&str> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["success", "failed", "skipped"]);
    assert_eq!(json["files"][1]["kind"], "missing_input");
    assert!(json["finished_at"].is_string());
}
