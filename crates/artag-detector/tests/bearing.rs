mod common;

use artag_detector::{BearingError, TagDetector, TagDetectorParams};

fn detector(fov_deg: f64) -> TagDetector {
    TagDetector::new(common::dictionary(), TagDetectorParams::new(fov_deg)).expect("detector")
}

#[test]
fn center_column_bearing_is_zero() {
    let det = detector(78.0);
    for width in [1usize, 7, 640, 1280, 1920] {
        assert_eq!(det.bearing(width as f64 / 2.0, width), Ok(0.0));
    }
}

#[test]
fn bearing_is_strictly_increasing() {
    for fov in [10.0, 78.0, 120.0] {
        let det = detector(fov);
        let width = 640;
        let values: Vec<f64> = (0..=width)
            .map(|x| det.bearing(x as f64, width).expect("bearing"))
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "fov {fov}");
        assert!(values[0] < 0.0 && values[width] > 0.0);
    }
}

#[test]
fn bearing_matches_closed_form() {
    let det = detector(60.0);
    let b = det.bearing(480.0, 640).expect("bearing");
    let expected = ((160.0f64 / 320.0) * 30.0f64.to_radians().tan()).atan().to_degrees();
    assert!((b - expected).abs() < 1e-12);
}

#[test]
fn zero_width_fails_fast() {
    assert_eq!(detector(78.0).bearing(0.0, 0), Err(BearingError::ZeroWidth));
}
