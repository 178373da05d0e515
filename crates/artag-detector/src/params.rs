use crate::preprocess::DEFAULT_DEPTH_THRESHOLD;
use artag_aruco::DetectorParameters;
use serde::{Deserialize, Serialize};

fn default_depth_threshold() -> f32 {
    DEFAULT_DEPTH_THRESHOLD
}

/// Configuration for [`crate::TagDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagDetectorParams {
    /// Camera horizontal field of view in degrees (supplied calibration constant).
    pub horizontal_fov_deg: f64,
    /// Pixels whose 3x3-smoothed depth is not below this are painted white
    /// before marker detection. Units follow the depth source.
    #[serde(default = "default_depth_threshold")]
    pub depth_threshold: f32,
    /// Candidate extraction and decoding parameters.
    #[serde(default)]
    pub marker: DetectorParameters,
}

impl TagDetectorParams {
    pub fn new(horizontal_fov_deg: f64) -> Self {
        Self {
            horizontal_fov_deg,
            depth_threshold: DEFAULT_DEPTH_THRESHOLD,
            marker: DetectorParameters::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_rover_defaults() {
        let p: TagDetectorParams =
            serde_json::from_str(r#"{ "horizontal_fov_deg": 78.0 }"#).expect("parse");
        assert_eq!(p, TagDetectorParams::new(78.0));
        assert_eq!(p.depth_threshold, 7000.0);
        assert_eq!(p.marker.marker_border_bits, 2);
        assert!(!p.marker.corner_refinement);
        assert_eq!(p.marker.polygonal_approx_accuracy_rate, 0.08);
    }

    #[test]
    fn field_of_view_is_required() {
        assert!(serde_json::from_str::<TagDetectorParams>(r#"{ "depth_threshold": 10.0 }"#).is_err());
    }
}
