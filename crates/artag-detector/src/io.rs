//! JSON configuration and report helpers.

use crate::preprocess::DEFAULT_DEPTH_THRESHOLD;
use crate::{Tag, TagDetectionResult, TagDetector, TagDetectorError, TagDetectorParams};
use artag_aruco::{DetectorParameters, MarkerDetection, Quad};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum TagDetectIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for running the tag detector on recorded frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetectConfig {
    /// Dictionary resource; relative paths resolve against the config file.
    pub dictionary_path: String,
    pub horizontal_fov_deg: f64,
    #[serde(default)]
    pub depth_threshold: Option<f32>,
    #[serde(default)]
    pub marker: Option<DetectorParameters>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl TagDetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TagDetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TagDetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("artag_detect_report.json"))
    }

    /// Dictionary path, resolved against the directory of `config_path`.
    pub fn dictionary_path(&self, config_path: &Path) -> PathBuf {
        let path = Path::new(&self.dictionary_path);
        match config_path.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Build detector parameters, applying overrides from the config.
    pub fn build_params(&self) -> TagDetectorParams {
        let mut params = TagDetectorParams::new(self.horizontal_fov_deg);
        params.depth_threshold = self.depth_threshold.unwrap_or(DEFAULT_DEPTH_THRESHOLD);
        if let Some(marker) = self.marker.clone() {
            params.marker = marker;
        }
        params
    }

    /// Load the dictionary and build a detector from this config.
    pub fn build_detector(&self, config_path: &Path) -> Result<TagDetector, TagDetectorError> {
        TagDetector::from_dictionary_file(self.dictionary_path(config_path), self.build_params())
    }
}

/// One resolved target slot in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagReport {
    pub tag: Tag,
    #[serde(default)]
    pub bearing_deg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetectReport {
    pub color_path: String,
    pub depth_path: String,
    pub config_path: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub first: Option<TagReport>,
    #[serde(default)]
    pub second: Option<TagReport>,
    #[serde(default)]
    pub markers: Vec<MarkerDetection>,
    #[serde(default)]
    pub rejected: Vec<Quad>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TagDetectReport {
    /// Build a base report for one frame.
    pub fn new(
        color_path: &Path,
        depth_path: &Path,
        config_path: &Path,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            color_path: color_path.to_string_lossy().into_owned(),
            depth_path: depth_path.to_string_lossy().into_owned(),
            config_path: config_path.to_string_lossy().into_owned(),
            width,
            height,
            first: None,
            second: None,
            markers: Vec::new(),
            rejected: Vec::new(),
            error: None,
        }
    }

    /// Populate report fields from a successful detection.
    pub fn set_detection(&mut self, detector: &TagDetector, res: &TagDetectionResult) {
        let slot = |tag: &Tag| TagReport {
            tag: *tag,
            bearing_deg: detector.tag_bearing(tag, self.width).ok().flatten(),
        };
        self.first = Some(slot(&res.first));
        self.second = Some(slot(&res.second));
        self.markers = res.candidates.accepted.clone();
        self.rejected = res.candidates.rejected.clone();
        self.error = None;
    }

    /// Record a detection error.
    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TagDetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TagDetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
