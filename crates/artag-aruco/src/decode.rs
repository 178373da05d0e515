//! Bit decoding of a single quadrilateral candidate.
//!
//! The candidate is mapped onto a canonical square of
//! `(marker_size + 2 * border) * cell_sample_px` pixels. Each cell is read as
//! a 3x3 mean at its center and binarized with an Otsu threshold computed
//! over a finer grid covering the whole marker.

use crate::detect::MarkerDetection;
use crate::params::DetectorParameters;
use crate::quad::Quad;
use crate::threshold::otsu_threshold;
use crate::Matcher;
use artag_core::{homography_from_4pt, GrayImageView, Homography};
use nalgebra::Point2;

/// Decode one candidate quad against the matcher's dictionary.
///
/// Returns `None` when the quad cannot be sampled, its border is not black
/// enough, or no dictionary code lies within the Hamming budget.
pub fn decode_marker_in_quad(
    image: &GrayImageView<'_>,
    corners: &Quad,
    matcher: &Matcher,
    params: &DetectorParameters,
) -> Option<MarkerDetection> {
    let mut decoder = QuadDecoder::new(params, matcher.dictionary().marker_size())?;
    decoder.decode(image, corners, matcher)
}

#[derive(Clone, Copy, Debug)]
struct MarkerObservation {
    code: u64,
    border_score: f32,
}

const MIN_SIDE_PX: f32 = 12.0;
const THRESH_SUBDIV: usize = 3;

struct SampleGrid {
    cells: usize,
    side: f32,
    points: Vec<Point2<f32>>, // row-major: cy * cells + cx
    threshold_points: Vec<Point2<f32>>,
}

impl SampleGrid {
    fn new(bits: usize, border: usize, cell_px: f32) -> Option<Self> {
        if bits == 0 || bits * bits > 64 {
            return None;
        }
        let cells = bits + 2 * border;
        let side = cells as f32 * cell_px;
        if side < MIN_SIDE_PX {
            return None;
        }

        let mut points = Vec::with_capacity(cells * cells);
        for cy in 0..cells {
            for cx in 0..cells {
                points.push(Point2::new(
                    (cx as f32 + 0.5) * cell_px,
                    (cy as f32 + 0.5) * cell_px,
                ));
            }
        }

        let grid = cells * THRESH_SUBDIV;
        let step = side / grid as f32;
        let mut threshold_points = Vec::with_capacity(grid * grid);
        for ty in 0..grid {
            for tx in 0..grid {
                threshold_points.push(Point2::new(
                    (tx as f32 + 0.5) * step,
                    (ty as f32 + 0.5) * step,
                ));
            }
        }

        Some(Self {
            cells,
            side,
            points,
            threshold_points,
        })
    }

    /// Canonical corners in the same order as candidate quads.
    fn rect_corners(&self) -> Quad {
        let s = self.side;
        [
            Point2::new(0.0, 0.0),
            Point2::new(s, 0.0),
            Point2::new(s, s),
            Point2::new(0.0, s),
        ]
    }
}

/// Reusable decoder; keeps its sampling grid and scratch buffers across quads.
pub(crate) struct QuadDecoder {
    bits: usize,
    border: usize,
    min_border_score: f32,
    grid: SampleGrid,
    scratch_bits: Vec<u8>,
    scratch_thr: Vec<u8>,
}

impl QuadDecoder {
    pub(crate) fn new(params: &DetectorParameters, bits: usize) -> Option<Self> {
        let grid = SampleGrid::new(bits, params.marker_border_bits, params.cell_sample_px)?;
        let scratch_bits = Vec::with_capacity(grid.points.len());
        let scratch_thr = Vec::with_capacity(grid.threshold_points.len());
        Some(Self {
            bits,
            border: params.marker_border_bits,
            min_border_score: params.min_border_score(),
            grid,
            scratch_bits,
            scratch_thr,
        })
    }

    pub(crate) fn decode(
        &mut self,
        img: &GrayImageView<'_>,
        corners: &Quad,
        matcher: &Matcher,
    ) -> Option<MarkerDetection> {
        let h = homography_from_4pt(&self.grid.rect_corners(), corners)?;
        let obs = self.observe(img, &h)?;
        build_detection(corners, obs, matcher)
    }

    fn observe(&mut self, img: &GrayImageView<'_>, h: &Homography) -> Option<MarkerObservation> {
        self.scratch_bits.clear();
        for p in &self.grid.points {
            let q = h.apply(*p);
            let v = sample_mean_3x3(img, q.x, q.y)?;
            self.scratch_bits.push(v);
        }

        self.scratch_thr.clear();
        for p in &self.grid.threshold_points {
            let q = h.apply(*p);
            if let Some(v) = sample_mean_3x3(img, q.x, q.y) {
                self.scratch_thr.push(v);
            }
        }

        decode_samples(
            &self.scratch_bits,
            &self.scratch_thr,
            self.grid.cells,
            self.bits,
            self.border,
            self.min_border_score,
        )
    }
}

fn build_detection(
    corners: &Quad,
    obs: MarkerObservation,
    matcher: &Matcher,
) -> Option<MarkerDetection> {
    let m = matcher.match_code(obs.code)?;
    // The marker's own top-left corner sits at index `rotation`.
    let mut corners = *corners;
    corners.rotate_left(m.rotation as usize);
    Some(MarkerDetection {
        id: m.id,
        corners,
        rotation: m.rotation,
        hamming: m.hamming,
        border_score: obs.border_score,
        code: obs.code,
    })
}

fn decode_samples(
    samples: &[u8],
    thr_samples: &[u8],
    cells: usize,
    bits: usize,
    border: usize,
    min_border_score: f32,
) -> Option<MarkerObservation> {
    if samples.len() != cells * cells {
        return None;
    }

    let thr = if thr_samples.is_empty() {
        otsu_threshold(samples)
    } else {
        otsu_threshold(thr_samples)
    };

    let mut border_ok = 0u32;
    let mut border_total = 0u32;
    let mut code: u64 = 0;

    for cy in 0..cells {
        for cx in 0..cells {
            let is_black = samples[cy * cells + cx] <= thr;
            let is_border =
                cx < border || cy < border || cx >= cells - border || cy >= cells - border;
            if is_border {
                border_total += 1;
                if is_black {
                    border_ok += 1;
                }
            } else if is_black {
                let idx = (cy - border) * bits + (cx - border); // row-major
                code |= 1u64 << idx;
            }
        }
    }

    let border_score = if border_total > 0 {
        border_ok as f32 / border_total as f32
    } else {
        1.0
    };
    if border_score < min_border_score {
        return None;
    }

    Some(MarkerObservation { code, border_score })
}

/// Integer mean of the 3x3 block around `(x, y)`; `None` when it leaves the image.
fn sample_mean_3x3(img: &GrayImageView<'_>, x: f32, y: f32) -> Option<u8> {
    if !(x.is_finite() && y.is_finite()) {
        return None;
    }
    let (cx, cy) = (x.floor() as i64, y.floor() as i64);
    let inside = |v: i64, len: usize| v >= 1 && v + 1 < len as i64;
    if !inside(cx, img.width) || !inside(cy, img.height) {
        return None;
    }
    let (cx, cy) = (cx as usize, cy as usize);
    let sum: u32 = (cy - 1..=cy + 1)
        .flat_map(|row| &img.data[row * img.width + cx - 1..=row * img.width + cx + 1])
        .map(|&v| u32::from(v))
        .sum();
    Some((sum / 9) as u8)
}
