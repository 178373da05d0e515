//! Frame preprocessing: color normalization and depth-based background removal.
//!
//! Marker detection works best on tags over a light, uncluttered background.
//! Pixels whose smoothed depth is at or beyond the near-range threshold are
//! painted white so far-field texture cannot produce candidates.

use crate::Frame;
use artag_core::{DepthImage, DepthImageView, GrayImage, RgbImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default near-range cut-off, in the depth source's native units.
pub const DEFAULT_DEPTH_THRESHOLD: f32 = 7000.0;

const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Frame-local buffers produced for one detection call.
#[derive(Clone, Debug)]
pub struct PreprocessedFrame {
    /// The color frame as packed RGB.
    pub rgb: RgbImage,
    /// `rgb` with far pixels painted white.
    pub filtered: RgbImage,
    /// Grayscale of `filtered`, fed to the marker detector.
    pub gray: GrayImage,
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))
)]
pub fn preprocess(frame: &Frame<'_>, depth_threshold: f32) -> PreprocessedFrame {
    let rgb = frame.color().to_rgb();
    let smoothed = mean_filter_3x3(frame.depth());
    let filtered = mask_far_pixels(&rgb, &smoothed, depth_threshold);
    let gray = filtered.to_gray();
    PreprocessedFrame {
        rgb,
        filtered,
        gray,
    }
}

/// 3x3 box filter with replicated borders.
///
/// A non-finite sample poisons its neighborhood; such pixels read as far.
pub fn mean_filter_3x3(depth: &DepthImageView<'_>) -> DepthImage {
    let (w, h) = (depth.width, depth.height);
    let mut out = DepthImage::new_filled(w, h, 0.0);
    if w == 0 || h == 0 {
        return out;
    }

    for y in 0..h {
        let rows = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        for x in 0..w {
            let cols = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum = 0.0f32;
            for &ry in &rows {
                for &cx in &cols {
                    sum += depth.get(cx, ry);
                }
            }
            out.data[y * w + x] = sum / 9.0;
        }
    }
    out
}

/// Keep a pixel's color only when its smoothed depth is below `threshold`.
pub fn mask_far_pixels(rgb: &RgbImage, smoothed: &DepthImage, threshold: f32) -> RgbImage {
    let mut out = rgb.clone();
    let mut far = 0usize;
    for (px, &d) in out.data.chunks_exact_mut(3).zip(&smoothed.data) {
        // NaN compares false and counts as far.
        let near = d < threshold;
        if !near {
            px.copy_from_slice(&BACKGROUND);
            far += 1;
        }
    }
    log::trace!(
        "depth mask: {far}/{} pixels at or beyond {threshold}",
        smoothed.data.len()
    );
    out
}
