//! End-to-end shade detection through the public API
//!
//! Photos are generated in memory, so no fixture files are needed.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgba};
use shade_match::{
    DetectionOutcome, DistanceMetric, Formulator, PaletteMatcher, PhotoSource, RawRgb,
    ReferenceShade, Rgb, SamplingConfig, SessionConfig, ShadeCatalog, ShadeLevel, ShadeSession,
    sampler,
};

fn encode(image: &ImageBuffer<Rgba<u8>, Vec<u8>>, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

fn solid_png(width: u32, height: u32, color: Rgb) -> PhotoSource {
    PhotoSource::Bytes(encode(
        &ImageBuffer::from_pixel(width, height, color.to_rgba()),
        ImageFormat::Png,
    ))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn black_photo_is_level_one() {
    let sample = sampler::sample_photo(
        &solid_png(120, 90, Rgb::new(14, 14, 14)),
        &SamplingConfig::default(),
    )
    .unwrap();
    assert_eq!(sample.color, Rgb::new(14, 14, 14));

    let catalog = ShadeCatalog::builtin();
    let matcher = PaletteMatcher::new(&catalog, DistanceMetric::WeightedHsl);
    assert_eq!(matcher.nearest_code(sample.color.into()), "1");
}

#[test]
fn lifting_from_five_to_eight() {
    let result = Formulator::default().plan(ShadeLevel(5), ShadeLevel(8));
    assert_eq!(result.levels_needed, 3);
    assert_eq!(result.estimated_minutes, 45);
}

#[test]
fn going_darker_is_clamped_to_zero_levels() {
    let result = Formulator::default().plan(ShadeLevel(7), ShadeLevel(4));
    assert_eq!(result.levels_needed, 0);
}

#[test]
fn nan_channel_picks_the_darkest_shade() {
    let catalog = ShadeCatalog::builtin();
    let matcher = PaletteMatcher::new(&catalog, DistanceMetric::WeightedHsl);
    assert_eq!(matcher.nearest_code(RawRgb::new(f64::NAN, 10.0, 10.0)), "1");
}

#[test]
fn single_pixel_photo_leaves_manual_selection() {
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default())
        .with_selection(Some("6"), Some("9"))
        .unwrap();
    let outcome = session.detect(solid_png(1, 1, Rgb::new(193, 167, 103)));
    let DetectionOutcome::Failed {
        advisory,
        recoverable,
    } = outcome
    else {
        panic!("expected a failure");
    };
    assert!(recoverable);
    assert!(!advisory.is_empty());
    assert_eq!(session.selection().base.as_deref(), Some("6"));
    assert_eq!(session.selection().target.as_deref(), Some("9"));
    // Manual selection still works and still calculates
    assert_eq!(session.calculate().unwrap().levels_needed, 3);
}

// ============================================================================
// Full form flow
// ============================================================================

#[test]
fn photo_then_target_then_calculate() {
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default());
    let DetectionOutcome::Detected(detection) =
        session.detect(solid_png(400, 300, Rgb::new(74, 29, 17)))
    else {
        panic!("expected a detection");
    };
    assert_eq!(detection.report.shade.code, "5");
    assert_eq!(detection.selection.base.as_deref(), Some("5"));
    // 400x300 photo: half size min(100, 75), every 2nd pixel of a 150x150 window
    assert_eq!(detection.sample.sample_count, 75 * 75);

    session.select_target("9.1").unwrap();
    let result = session.calculate().unwrap();
    assert_eq!(result.levels_needed, 4);
    assert_eq!(result.estimated_minutes, 60);
    assert_eq!(result.oxidant_volume, 40);
}

#[test]
fn bmp_photo_is_detected() {
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default());
    let photo = encode(
        &ImageBuffer::from_pixel(64, 64, Rgb::new(193, 167, 103).to_rgba()),
        ImageFormat::Bmp,
    );
    let DetectionOutcome::Detected(detection) = session.detect(PhotoSource::Bytes(photo)) else {
        panic!("expected a detection");
    };
    assert_eq!(detection.report.shade.code, "9");
}

#[test]
fn photo_on_disk() {
    let path = std::env::temp_dir().join(format!("shade-match-before-{}.png", std::process::id()));
    ImageBuffer::from_pixel(50, 50, Rgba([140u8, 115, 64, 255]))
        .save(&path)
        .unwrap();
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default());
    let outcome = session.detect(PhotoSource::Path(path.clone()));
    std::fs::remove_file(&path).unwrap();
    let DetectionOutcome::Detected(detection) = outcome else {
        panic!("expected a detection");
    };
    assert_eq!(detection.report.shade.code, "8");
}

#[test]
fn missing_photo_is_recoverable() {
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default());
    let outcome = session.detect(PhotoSource::Path("/nonexistent/before.jpg".into()));
    assert!(matches!(
        outcome,
        DetectionOutcome::Failed {
            recoverable: true,
            ..
        }
    ));
    assert!(session.advisory().is_some());
    assert!(session.selection().base.is_none());
}

// ============================================================================
// Injected catalogs and metrics
// ============================================================================

#[test]
fn custom_catalog_is_used_for_matching_and_fallback() {
    let catalog = ShadeCatalog::new(vec![
        ReferenceShade::new("8", "Copper Light Blonde", Rgb::new(180, 100, 50)),
        ReferenceShade::new("2", "Blue Black", Rgb::new(20, 22, 35)),
    ])
    .unwrap();
    let matcher = PaletteMatcher::new(&catalog, DistanceMetric::Rgb);
    assert_eq!(matcher.nearest_code(RawRgb::new(170.0, 110.0, 60.0)), "8");
    assert_eq!(matcher.nearest_code(RawRgb::new(f64::NAN, 0.0, 0.0)), "2");
}

#[test]
fn every_metric_finds_catalog_colors_in_photos() {
    let catalog = ShadeCatalog::builtin();
    for metric in [
        DistanceMetric::WeightedHsl,
        DistanceMetric::Rgb,
        DistanceMetric::Lab,
    ] {
        let config = SessionConfig {
            metric,
            ..SessionConfig::default()
        };
        let mut session = ShadeSession::new(catalog.clone(), config);
        for shade in catalog.shades() {
            let DetectionOutcome::Detected(detection) = session.detect(solid_png(32, 32, shade.rgb))
            else {
                panic!("expected a detection for {}", shade.code);
            };
            assert_eq!(detection.report.shade.code, shade.code, "{metric:?}");
        }
    }
}

#[test]
fn detection_outcome_serializes_for_the_host() {
    let mut session = ShadeSession::new(ShadeCatalog::builtin(), SessionConfig::default());
    let outcome = session.detect(solid_png(32, 32, Rgb::new(14, 14, 14)));
    let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "detected");
    assert_eq!(json["match"]["shade"]["code"], "1");
    assert_eq!(json["selection"]["base"], "1");
}
