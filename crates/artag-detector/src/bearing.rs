use crate::{BearingError, TagDetectorError};

/// Converts image columns to signed steering bearings.
///
/// The bearing of column `x` in a frame `w` pixels wide is
/// `atan((x - w/2) / (w/2) * tan(fov/2))`, in degrees: zero on the optical
/// axis, negative to the left, positive to the right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BearingCalculator {
    fov_deg: f64,
    tan_half_fov: f64,
}

impl BearingCalculator {
    /// Horizontal field of view in degrees, strictly between 0 and 180.
    pub fn new(horizontal_fov_deg: f64) -> Result<Self, TagDetectorError> {
        if !(horizontal_fov_deg > 0.0 && horizontal_fov_deg < 180.0) {
            return Err(TagDetectorError::InvalidFieldOfView {
                degrees: horizontal_fov_deg,
            });
        }
        Ok(Self {
            fov_deg: horizontal_fov_deg,
            tan_half_fov: (horizontal_fov_deg.to_radians() / 2.0).tan(),
        })
    }

    #[inline]
    pub fn horizontal_fov_deg(&self) -> f64 {
        self.fov_deg
    }

    pub fn bearing(&self, pixel_x: f64, frame_width: usize) -> Result<f64, BearingError> {
        if frame_width == 0 {
            return Err(BearingError::ZeroWidth);
        }
        let half = frame_width as f64 / 2.0;
        Ok(((pixel_x - half) / half * self.tan_half_fov)
            .atan()
            .to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_column_has_zero_bearing() {
        let calc = BearingCalculator::new(78.0).expect("fov");
        for width in [1usize, 2, 3, 640, 1280, 4095] {
            assert_eq!(calc.bearing(width as f64 / 2.0, width), Ok(0.0));
        }
    }

    #[test]
    fn frame_edges_are_at_half_fov() {
        let calc = BearingCalculator::new(90.0).expect("fov");
        let left = calc.bearing(0.0, 640).expect("bearing");
        let right = calc.bearing(640.0, 640).expect("bearing");
        assert!((left + 45.0).abs() < 1e-9, "{left}");
        assert!((right - 45.0).abs() < 1e-9, "{right}");
    }

    #[test]
    fn bearing_strictly_increases_with_x() {
        for fov in [1.0, 60.0, 110.0, 179.0] {
            let calc = BearingCalculator::new(fov).expect("fov");
            let mut prev = f64::NEG_INFINITY;
            for x in 0..=1280 {
                let b = calc.bearing(x as f64, 1280).expect("bearing");
                assert!(b > prev, "fov {fov}: bearing({x}) = {b} <= {prev}");
                prev = b;
            }
        }
    }

    #[test]
    fn zero_width_is_an_error() {
        let calc = BearingCalculator::new(60.0).expect("fov");
        assert_eq!(calc.bearing(0.0, 0), Err(BearingError::ZeroWidth));
        assert_eq!(calc.bearing(12.0, 0), Err(BearingError::ZeroWidth));
    }

    #[test]
    fn field_of_view_is_validated() {
        for fov in [0.0, -10.0, 180.0, 200.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                BearingCalculator::new(fov),
                Err(TagDetectorError::InvalidFieldOfView { .. })
            ));
        }
    }
}
