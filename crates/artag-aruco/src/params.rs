use serde::{Deserialize, Serialize};

/// Invalid detector parameter values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{name} must be finite and positive (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must lie in [0, 1] (got {value})")]
    NotAFraction { name: &'static str, value: f32 },
    #[error("min_marker_perimeter_rate ({min}) exceeds max_marker_perimeter_rate ({max})")]
    PerimeterRange { min: f32, max: f32 },
}

/// Tuning for quad extraction and marker decoding.
///
/// Rates are relative to the larger image side (perimeter bounds) or to the
/// candidate perimeter (corner spacing, polygon approximation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParameters {
    /// Border width in cells around the inner bit grid.
    pub marker_border_bits: usize,
    /// Refit corners from the contour edges after polygon approximation.
    pub corner_refinement: bool,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub polygonal_approx_accuracy_rate: f32,
    pub min_marker_perimeter_rate: f32,
    pub max_marker_perimeter_rate: f32,
    /// Minimum distance between any two corners, relative to the perimeter.
    pub min_corner_distance_rate: f32,
    /// Candidates with a corner closer than this to the image edge are dropped.
    pub min_distance_to_border: usize,
    /// Tolerated fraction of non-black border cells.
    pub max_erroneous_bits_in_border_rate: f32,
    /// Fraction of the dictionary's correction capability used when matching.
    pub error_correction_rate: f32,
    /// Canonical pixels per cell used when sampling a rectified candidate.
    pub cell_sample_px: f32,
    /// Images whose intensity range is below this yield no candidates.
    pub min_contrast: u8,
}

impl Default for DetectorParameters {
    fn default() -> Self {
        Self {
            marker_border_bits: 2,
            corner_refinement: false,
            polygonal_approx_accuracy_rate: 0.08,
            min_marker_perimeter_rate: 0.03,
            max_marker_perimeter_rate: 4.0,
            min_corner_distance_rate: 0.05,
            min_distance_to_border: 3,
            max_erroneous_bits_in_border_rate: 0.35,
            error_correction_rate: 0.6,
            cell_sample_px: 6.0,
            min_contrast: 20,
        }
    }
}

impl DetectorParameters {
    pub fn validate(&self) -> Result<(), ParamsError> {
        positive(
            "polygonal_approx_accuracy_rate",
            self.polygonal_approx_accuracy_rate,
        )?;
        positive("min_marker_perimeter_rate", self.min_marker_perimeter_rate)?;
        positive("max_marker_perimeter_rate", self.max_marker_perimeter_rate)?;
        positive("cell_sample_px", self.cell_sample_px)?;
        fraction("min_corner_distance_rate", self.min_corner_distance_rate)?;
        fraction(
            "max_erroneous_bits_in_border_rate",
            self.max_erroneous_bits_in_border_rate,
        )?;
        fraction("error_correction_rate", self.error_correction_rate)?;
        if self.min_marker_perimeter_rate > self.max_marker_perimeter_rate {
            return Err(ParamsError::PerimeterRange {
                min: self.min_marker_perimeter_rate,
                max: self.max_marker_perimeter_rate,
            });
        }
        Ok(())
    }

    /// Hamming budget granted to the matcher for a dictionary.
    pub fn max_hamming(&self, max_correction_bits: u8) -> u8 {
        (f32::from(max_correction_bits) * self.error_correction_rate).floor() as u8
    }

    /// Minimum fraction of black border cells for a candidate to be decoded.
    #[inline]
    pub(crate) fn min_border_score(&self) -> f32 {
        1.0 - self.max_erroneous_bits_in_border_rate
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ParamsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NotPositive { name, value })
    }
}

fn fraction(name: &'static str, value: f32) -> Result<(), ParamsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParamsError::NotAFraction { name, value })
    }
}
