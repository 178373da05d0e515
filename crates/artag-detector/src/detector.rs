use crate::bearing::BearingCalculator;
use crate::preprocess::{preprocess, PreprocessedFrame};
use crate::select::select_tags;
use crate::{BearingError, Frame, FrameError, Tag, TagDetectorError, TagDetectorParams};
use artag_aruco::{Dictionary, MarkerCandidates, MarkerDetector};
use artag_core::{ColorImageView, DepthImageView};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Full per-frame output, for reports and debugging.
#[derive(Clone, Debug)]
pub struct TagDetectionResult {
    pub first: Tag,
    pub second: Tag,
    /// Accepted and rejected marker candidates in scan order.
    pub candidates: MarkerCandidates,
    pub preprocessed: PreprocessedFrame,
}

impl TagDetectionResult {
    #[inline]
    pub fn tags(&self) -> (Tag, Tag) {
        (self.first, self.second)
    }
}

/// Rover AR-tag detector.
///
/// Owns the dictionary and tuning for its whole lifetime and holds no
/// per-frame state, so one instance can serve several threads.
#[derive(Clone, Debug)]
pub struct TagDetector {
    markers: MarkerDetector,
    bearing: BearingCalculator,
    params: TagDetectorParams,
}

impl TagDetector {
    pub fn new(dictionary: Dictionary, params: TagDetectorParams) -> Result<Self, TagDetectorError> {
        let bearing = BearingCalculator::new(params.horizontal_fov_deg)?;
        if params.depth_threshold.is_nan() {
            return Err(TagDetectorError::InvalidDepthThreshold);
        }
        let markers = MarkerDetector::new(dictionary, params.marker.clone())?;
        log::info!(
            "tag detector ready: dictionary '{}' ({} markers), max hamming {}, fov {} deg, depth threshold {}",
            markers.matcher().dictionary().name(),
            markers.matcher().dictionary().codes().len(),
            markers.matcher().max_hamming(),
            params.horizontal_fov_deg,
            params.depth_threshold
        );
        Ok(Self {
            markers,
            bearing,
            params,
        })
    }

    /// Load the dictionary resource and build the detector.
    pub fn from_dictionary_file(
        path: impl AsRef<Path>,
        params: TagDetectorParams,
    ) -> Result<Self, TagDetectorError> {
        let dictionary = Dictionary::load_json(path)?;
        Self::new(dictionary, params)
    }

    #[inline]
    pub fn params(&self) -> &TagDetectorParams {
        &self.params
    }

    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        self.markers.matcher().dictionary()
    }

    /// Detect up to two tags, ordered left to right.
    ///
    /// Finding no tags is not an error: empty slots hold [`Tag::none`].
    pub fn detect(
        &self,
        color: &ColorImageView<'_>,
        depth: &DepthImageView<'_>,
    ) -> Result<(Tag, Tag), FrameError> {
        let frame = Frame::new(*color, *depth)?;
        Ok(self.detect_frame(&frame).tags())
    }

    /// Like [`TagDetector::detect`], keeping the intermediate buffers and candidates.
    pub fn detect_with_diagnostics(
        &self,
        color: &ColorImageView<'_>,
        depth: &DepthImageView<'_>,
    ) -> Result<TagDetectionResult, FrameError> {
        let frame = Frame::new(*color, *depth)?;
        Ok(self.detect_frame(&frame))
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect_frame(&self, frame: &Frame<'_>) -> TagDetectionResult {
        let preprocessed = preprocess(frame, self.params.depth_threshold);
        let candidates = self.markers.detect(&preprocessed.gray.view());
        let (first, second) = select_tags(&candidates.accepted);
        log::debug!(
            "frame {}x{}: {} accepted, {} rejected -> ({}, {})",
            frame.width(),
            frame.height(),
            candidates.accepted.len(),
            candidates.rejected.len(),
            first.id(),
            second.id()
        );
        TagDetectionResult {
            first,
            second,
            candidates,
            preprocessed,
        }
    }

    /// Bearing in degrees of column `pixel_x` relative to the optical axis.
    pub fn bearing(&self, pixel_x: f64, frame_width: usize) -> Result<f64, BearingError> {
        self.bearing.bearing(pixel_x, frame_width)
    }

    /// Bearing of a tag's center, or `None` for the sentinel.
    pub fn tag_bearing(&self, tag: &Tag, frame_width: usize) -> Result<Option<f64>, BearingError> {
        if !tag.is_valid() {
            return Ok(None);
        }
        self.bearing(f64::from(tag.loc().x), frame_width).map(Some)
    }
}
