//! Error classification and stage attribution

mod common;

use common::{centered_square, FailingSegmenter, FixedSegmenter, FnFaceParser, WrongSizeFaceParser};
use image::RgbImage;
use socialfx::{
    apply_face_blur, apply_stroke, AlphaCompositor, Color, EffectConfig, EffectError,
    EffectProcessor, ErrorKind, Mask, MaskScaler, ProcessingStage, ScaleAlgorithm, ScaleSpec,
};
use std::str::FromStr;

#[test]
fn provider_failure_is_tagged_with_segmentation_stage() {
    let image = RgbImage::new(16, 16);
    let err = apply_stroke(&image, &mut FailingSegmenter, Color::YELLOW, 1.05).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert_eq!(err.stage(), Some(ProcessingStage::Segmentation));
    assert!(err.to_string().contains("model session is gone"));
}

#[test]
fn mask_with_wrong_dimensions_is_a_provider_failure() {
    let image = RgbImage::new(40, 30);
    let mut segmenter = FixedSegmenter(centered_square(20, 10));

    let err = apply_stroke(&image, &mut segmenter, Color::YELLOW, 1.05).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert_eq!(err.stage(), Some(ProcessingStage::Segmentation));
}

#[test]
fn class_map_with_wrong_dimensions_is_a_provider_failure() {
    let image = RgbImage::new(40, 30);
    let err = apply_face_blur(&image, &mut WrongSizeFaceParser, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
    assert_eq!(err.stage(), Some(ProcessingStage::FaceParsing));
}

#[test]
fn empty_image_is_invalid_input() {
    let image = RgbImage::new(0, 0);
    let err = apply_stroke(&image, &mut FixedSegmenter(Mask::new(0, 0)), Color::YELLOW, 1.05)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut parser = FnFaceParser::new(|_, _| 1);
    let err = apply_face_blur(&image, &mut parser, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(parser.seen.is_empty());
}

#[test]
fn invalid_parameters_are_rejected() {
    for kernel in [0, 2, 32] {
        let err = EffectConfig::builder().blur_kernel(kernel).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "kernel {kernel}");
    }
    for factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let err = ScaleSpec::zoom(factor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "factor {factor}");
    }

    let err = ScaleAlgorithm::from_str("3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(ScaleAlgorithm::try_from(3u8).is_err());

    let err = EffectConfig::builder().class_ids(Vec::new()).build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn processor_rejects_config_mutated_into_invalid_state() {
    let mut config = EffectConfig::default();
    config.blur.kernel_size = 4;
    let err = EffectProcessor::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn dimension_mismatch_in_compositor_is_invalid_input() {
    let base = RgbImage::new(10, 10);
    let foreground = RgbImage::new(10, 10);
    let err = AlphaCompositor::new()
        .composite(&base, &foreground, &Mask::new(9, 10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn zero_sized_mask_cannot_be_scaled() {
    let err = MaskScaler::crop_resize(&Mask::new(0, 5), 1.05).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn stage_context_is_rendered_in_message() {
    let err = EffectError::invalid_input("truncated file").at_stage(ProcessingStage::ImageLoading);
    let message = err.to_string();
    assert!(message.contains("truncated file"));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.stage(), Some(ProcessingStage::ImageLoading));
}
