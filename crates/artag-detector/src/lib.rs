//! Tag-based visual localization for a ground rover.
//!
//! Given a synchronized color + depth frame, [`TagDetector`]:
//! - paints far-field pixels white using a 3x3-smoothed depth map,
//! - finds and decodes markers from a fixed dictionary (`artag-aruco`),
//! - resolves the raw detections to at most two targets, ordered left to right,
//! - converts image columns to steering bearings.
//!
//! ```no_run
//! use artag_core::{ColorImageView, DepthImageView, PixelFormat};
//! use artag_detector::{TagDetector, TagDetectorParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = TagDetector::from_dictionary_file("alvar_dict.json", TagDetectorParams::new(78.0))?;
//! let (w, h) = (640, 480);
//! let rgba = vec![255u8; w * h * 4];
//! let depth = vec![1000.0f32; w * h];
//! let color = ColorImageView::new(w, h, PixelFormat::Rgba, &rgba)?;
//! let depth = DepthImageView::new(w, h, &depth)?;
//!
//! let (first, second) = detector.detect(&color, &depth)?;
//! for tag in [first, second].iter().filter(|t| t.is_valid()) {
//!     let bearing = detector.bearing(f64::from(tag.loc().x), w)?;
//!     println!("tag {} at {:?}, bearing {bearing:.1} deg", tag.id(), tag.loc());
//! }
//! # Ok(())
//! # }
//! ```

mod bearing;
mod detector;
mod diagnostics;
mod error;
mod frame;
mod io;
mod params;
mod preprocess;
mod select;
mod tag;

pub use bearing::BearingCalculator;
pub use detector::{TagDetectionResult, TagDetector};
pub use diagnostics::draw_rejected;
pub use error::{BearingError, FrameError, TagDetectorError};
pub use frame::Frame;
pub use io::{TagDetectConfig, TagDetectIoError, TagDetectReport, TagReport};
pub use params::TagDetectorParams;
pub use preprocess::{
    mask_far_pixels, mean_filter_3x3, preprocess, PreprocessedFrame, DEFAULT_DEPTH_THRESHOLD,
};
pub use select::select_tags;
pub use tag::{InvalidTag, Tag};
