//! Batch runs over files on disk and debug image dumps

mod common;

use common::{gradient_image, FnFaceParser, FnSegmenter};
use image::{Rgb, RgbImage};
use socialfx::services::{BatchJob, BatchRunner, NoOpProgressReporter};
use socialfx::{EffectConfig, EffectProcessor, ErrorKind, ImageIOService, ProcessingStage};
use tempfile::TempDir;

fn write_image(dir: &TempDir, name: &str, image: &RgbImage) -> std::path::PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

fn box_segmenter() -> FnSegmenter<impl Fn(u32, u32, u32, u32) -> bool> {
    FnSegmenter::new(|x, y, w, h| (w / 3..2 * w / 3).contains(&x) && (h / 3..2 * h / 3).contains(&y))
}

#[test]
fn one_bad_image_does_not_abort_the_batch() {
    let dir = TempDir::new().unwrap();
    let first = write_image(&dir, "a.png", &gradient_image(30, 30));
    let corrupt = dir.path().join("b.png");
    std::fs::write(&corrupt, b"not a png").unwrap();
    let last = write_image(&dir, "c.png", &gradient_image(20, 40));
    let out = dir.path().join("out");

    let jobs: Vec<BatchJob> = [&first, &corrupt, &last]
        .iter()
        .map(|input| BatchJob::new(*input, BatchJob::output_path_for(input, &out)))
        .collect();

    let processor = EffectProcessor::new(EffectConfig::default()).unwrap();
    let mut segmenter = box_segmenter();
    let reporter = NoOpProgressReporter;
    let report = BatchRunner::new(&reporter, 90).run(&jobs, |image, _| {
        processor.stroke(image, &mut segmenter)
    });

    assert_eq!(report.processed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].input, corrupt);
    assert_eq!(report.failures[0].stage, Some(ProcessingStage::ImageLoading));
    assert_eq!(report.failures[0].kind, ErrorKind::InvalidInput);
    // the model never saw the corrupt file
    assert_eq!(segmenter.calls, 2);

    let saved = ImageIOService::load_image(out.join("c.png")).unwrap();
    assert_eq!(saved.dimensions(), (20, 40));
    assert!(!out.join("b.png").exists());
}

#[test]
fn batch_passes_background_to_the_effect() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "subject.png", &RgbImage::from_pixel(30, 30, Rgb([0, 0, 255])));
    let background = write_image(&dir, "bg.png", &RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])));
    let output = dir.path().join("out/subject.png");
    let jobs = vec![BatchJob::new(&input, &output).with_background(&background)];

    let processor = EffectProcessor::new(EffectConfig::default()).unwrap();
    let mut segmenter = box_segmenter();
    let reporter = NoOpProgressReporter;
    let report = BatchRunner::new(&reporter, 90).run(&jobs, |image, bg| match bg {
        Some(bg) => processor.stroke_with_background(image, bg, &mut segmenter),
        None => processor.stroke(image, &mut segmenter),
    });

    assert!(report.is_success());
    let saved = ImageIOService::load_image(&output).unwrap();
    let corner = saved.get_pixel(0, 0);
    assert!(corner[0] >= 254 && corner[2] <= 1);
}

#[test]
fn jpeg_output_uses_configured_quality() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &gradient_image(64, 64));
    let low = dir.path().join("low.jpg");
    let high = dir.path().join("high.jpg");

    let processor = EffectProcessor::new(EffectConfig::default()).unwrap();
    let mut segmenter = box_segmenter();
    let reporter = NoOpProgressReporter;
    for (path, quality) in [(&low, 10), (&high, 100)] {
        let jobs = vec![BatchJob::new(&input, path)];
        let report = BatchRunner::new(&reporter, quality)
            .run(&jobs, |image, _| processor.stroke(image, &mut segmenter));
        assert!(report.is_success());
    }

    let low_size = std::fs::metadata(&low).unwrap().len();
    let high_size = std::fs::metadata(&high).unwrap().len();
    assert!(low_size < high_size);
}

#[test]
fn stroke_debug_dumps_use_stage_numbered_names() {
    let dir = TempDir::new().unwrap();
    let debug_dir = dir.path().join("debug");
    let config = EffectConfig::builder().debug_dir(&debug_dir).build().unwrap();
    let processor = EffectProcessor::new(config).unwrap();

    processor
        .stroke(&gradient_image(40, 40), &mut box_segmenter())
        .unwrap();

    for name in [
        "d001_overlay_image.png",
        "d002_unet2_mask_image.png",
        "d003_unet2_mask_scaled_image.png",
        "d004_overlay_mask_image.png",
        "d005_overlay_image.png",
    ] {
        assert!(debug_dir.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn blur_debug_dumps_use_stage_numbered_names() {
    let dir = TempDir::new().unwrap();
    let debug_dir = dir.path().join("debug");
    let config = EffectConfig::builder()
        .blur_kernel(3)
        .debug_dir(&debug_dir)
        .build()
        .unwrap();
    let processor = EffectProcessor::new(config).unwrap();
    let mut parser = FnFaceParser::new(|x, _| if x < 0.5 { 1 } else { 0 });

    processor.face_blur(&gradient_image(40, 40), &mut parser).unwrap();

    for name in [
        "d001_input_image.png",
        "d002_input_resized.png",
        "d003_face_mask.png",
        "d004_input_blurred.png",
        "d006_final.png",
    ] {
        assert!(debug_dir.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn debug_disabled_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let debug_dir = dir.path().join("debug");
    let mut config = EffectConfig::default();
    config.debug.directory = debug_dir.clone();
    let processor = EffectProcessor::new(config).unwrap();

    processor
        .stroke(&gradient_image(20, 20), &mut box_segmenter())
        .unwrap();

    assert!(!processor.debug_sink().is_enabled());
    assert!(!debug_dir.exists());
}
