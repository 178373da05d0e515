//! Marker candidate detection: quad extraction followed by decoding.

use crate::decode::QuadDecoder;
use crate::params::{DetectorParameters, ParamsError};
use crate::quad::{find_quad_candidates, Quad};
use crate::{Dictionary, Matcher};
use artag_core::{quad_center, GrayImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One decoded marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    pub id: u32,
    /// Image corners, clockwise on screen, starting at the marker's own
    /// top-left corner.
    pub corners: Quad,
    /// Rotation `0..=3` such that `code == rotate(dictionary_code, rotation)`.
    pub rotation: u8,
    pub hamming: u8,
    /// Fraction of border cells read as black.
    pub border_score: f32,
    /// Observed inner bits (row-major, black=1).
    pub code: u64,
}

impl MarkerDetection {
    /// Arithmetic mean of the four corners.
    pub fn center(&self) -> Point2<f32> {
        quad_center(&self.corners)
    }
}

/// Output of one detection pass.
///
/// Both lists keep the raster order in which candidates were found.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerCandidates {
    pub accepted: Vec<MarkerDetection>,
    /// Quads that looked like markers but did not decode.
    pub rejected: Vec<Quad>,
}

/// Marker detector bound to one dictionary for its whole lifetime.
#[derive(Clone, Debug)]
pub struct MarkerDetector {
    matcher: Matcher,
    params: DetectorParameters,
}

impl MarkerDetector {
    pub fn new(dictionary: Dictionary, params: DetectorParameters) -> Result<Self, ParamsError> {
        params.validate()?;
        let max_hamming = params.max_hamming(dictionary.max_correction_bits());
        Ok(Self {
            matcher: Matcher::new(dictionary, max_hamming),
            params,
        })
    }

    #[inline]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[inline]
    pub fn params(&self) -> &DetectorParameters {
        &self.params
    }

    /// Find and decode all marker candidates in a grayscale image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = image.width, height = image.height))
    )]
    pub fn detect(&self, image: &GrayImageView<'_>) -> MarkerCandidates {
        let quads = find_quad_candidates(image, &self.params);
        let mut out = MarkerCandidates::default();

        let Some(mut decoder) =
            QuadDecoder::new(&self.params, self.matcher.dictionary().marker_size())
        else {
            out.rejected = quads;
            return out;
        };

        for quad in quads {
            match decoder.decode(image, &quad, &self.matcher) {
                Some(det) => out.accepted.push(det),
                None => out.rejected.push(quad),
            }
        }

        log::debug!(
            "marker detection: {} accepted, {} rejected",
            out.accepted.len(),
            out.rejected.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artag_core::GrayImage;

    const CODES: [u64; 4] = [0x1f8c3a5, 0x0ab3c71, 0x16e9d02, 0x0c5f1b8];

    fn detector() -> MarkerDetector {
        let dict = Dictionary::new("test", 5, 3, CODES.to_vec()).expect("dict");
        MarkerDetector::new(dict, DetectorParameters::default()).expect("detector")
    }

    fn draw_marker(img: &mut GrayImage, x0: usize, y0: usize, cell: usize, pattern: u64) {
        for cy in 0..9 {
            for cx in 0..9 {
                let inner = (2..7).contains(&cx) && (2..7).contains(&cy);
                let black = !inner || (pattern >> ((cy - 2) * 5 + (cx - 2))) & 1 == 1;
                if !black {
                    continue;
                }
                for y in 0..cell {
                    for x in 0..cell {
                        img.data[(y0 + cy * cell + y) * img.width + x0 + cx * cell + x] = 0;
                    }
                }
            }
        }
    }

    #[test]
    fn accepts_markers_and_rejects_plain_squares() {
        let mut img = GrayImage::new_filled(240, 160, 255);
        draw_marker(&mut img, 20, 30, 8, CODES[1]);
        draw_marker(&mut img, 140, 20, 7, CODES[3]);
        for y in 110..150 {
            for x in 100..140 {
                img.data[y * 240 + x] = 0;
            }
        }

        let det = detector();
        assert_eq!(det.matcher().max_hamming(), 1);
        let out = det.detect(&img.view());

        // Raster order: the marker at y=20 is scanned first.
        let ids: Vec<u32> = out.accepted.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(out.accepted[0].center(), Point2::new(171.5, 51.5));
        assert_eq!(out.accepted[1].center(), Point2::new(56.0, 66.0));
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(quad_center(&out.rejected[0]), Point2::new(120.0, 130.0));
    }

    #[test]
    fn blank_image_yields_nothing() {
        let img = GrayImage::new_filled(64, 64, 255);
        let out = detector().detect(&img.view());
        assert!(out.accepted.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let dict = Dictionary::new("test", 5, 3, CODES.to_vec()).expect("dict");
        let params = DetectorParameters {
            cell_sample_px: 0.0,
            ..DetectorParameters::default()
        };
        assert!(MarkerDetector::new(dict, params).is_err());
    }
}
